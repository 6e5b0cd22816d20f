mod price;
mod serve;
mod sources;

pub use sources::SourcesResponseData;

use std::process::ExitCode;

use ashare_core::{SourceRouter, SourceRouterBuilder};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Price(args) => {
            let router = build_router(cli)?;
            price::run(args, &router, cli.format, cli.pretty).await
        }
        Command::Sources => sources::run(cli.format, cli.pretty),
        Command::Serve(args) => {
            let router = build_router(cli)?;
            serve::run(args, router).await
        }
    }
}

fn build_router(cli: &Cli) -> Result<SourceRouter, CliError> {
    let mut builder = SourceRouterBuilder::new().with_env_overrides();
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        builder = builder.with_timeout_ms(timeout_ms);
    }
    Ok(builder.build())
}
