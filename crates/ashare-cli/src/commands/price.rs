use std::process::ExitCode;

use ashare_core::{get_price, SourceRouter};

use crate::cli::{OutputFormat, PriceArgs};
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &PriceArgs,
    router: &SourceRouter,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode, CliError> {
    let tool_args = ashare_core::PriceArgs {
        code: args.code.clone(),
        end_date: args.end_date.clone(),
        count: args.count,
        frequency: args.frequency.clone(),
        fields: args.fields.clone(),
    };

    let result = get_price(router, &tool_args).await;
    output::render_stock_data(&result, format, pretty)?;

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(3))
    }
}
