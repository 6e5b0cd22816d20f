use std::process::ExitCode;

use ashare_core::{Frequency, RoutePlan, SourceId};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
pub struct RouteRow {
    pub frequency: Frequency,
    pub primary: SourceId,
    pub fallback: Option<SourceId>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponseData {
    pub routes: Vec<RouteRow>,
}

pub fn run(format: OutputFormat, pretty: bool) -> Result<ExitCode, CliError> {
    let routes = Frequency::ALL
        .into_iter()
        .map(|frequency| {
            let plan = RoutePlan::for_frequency(frequency);
            RouteRow {
                frequency,
                primary: plan.primary,
                fallback: plan.fallback,
            }
        })
        .collect::<Vec<_>>();

    output::render_routes(&SourcesResponseData { routes }, format, pretty)?;
    Ok(ExitCode::SUCCESS)
}
