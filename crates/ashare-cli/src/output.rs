use serde::Serialize;
use serde_json::Value;

use ashare_core::StockData;

use crate::cli::OutputFormat;
use crate::commands::SourcesResponseData;
use crate::error::CliError;

pub fn render_stock_data(
    result: &StockData,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", to_json(result, pretty)?),
        OutputFormat::Table => print!("{}", stock_data_table(result)),
    }
    Ok(())
}

pub fn render_routes(
    routes: &SourcesResponseData,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", to_json(routes, pretty)?),
        OutputFormat::Table => {
            println!("{:<10} {:<16} {:<16}", "frequency", "primary", "fallback");
            for row in &routes.routes {
                let fallback = row.fallback.map_or("-", |source| source.as_str());
                println!(
                    "{:<10} {:<16} {:<16}",
                    row.frequency.as_str(),
                    row.primary.as_str(),
                    fallback
                );
            }
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

fn stock_data_table(result: &StockData) -> String {
    let mut out = format!("code   : {}\nmessage: {}\n", result.code, result.message);

    let columns = result
        .data
        .get("columns")
        .and_then(Value::as_array)
        .map(|columns| {
            columns
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let Some(records) = result.data.get("records").and_then(Value::as_array) else {
        return out;
    };

    let widths = columns
        .iter()
        .map(|column| if column == "time" { 19 } else { 12 })
        .collect::<Vec<_>>();

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{column:<width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(header.trim_end());
    out.push('\n');

    for record in records {
        let line = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| {
                let cell = match record.get(column) {
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                format!("{cell:<width$}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}
