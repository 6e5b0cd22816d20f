use std::process::ExitCode;

use ashare_core::SourceRouter;
use tokio::io::BufReader;

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::server::ToolServer;

pub async fn run(args: &ServeArgs, router: SourceRouter) -> Result<ExitCode, CliError> {
    if !args.stdio {
        return Err(CliError::Command(String::from(
            "stdio is the only supported transport",
        )));
    }

    let server = ToolServer::new(router);
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(ExitCode::SUCCESS)
}
