use std::path::Path;

use anyhow::Context;
use basinq_core::{enrich_values, AppConfig, Catalog};
use serde_json::Value;

use crate::output::{render_report, OutputFormat};

/// Price the structure rows in a JSON file and print the report.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a structure list.
pub(crate) fn run_enrich(
    config: &AppConfig,
    catalog: &Catalog,
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = parse_structure_file(&content)
        .with_context(|| format!("invalid structure file {}", path.display()))?;

    let report = enrich_values(catalog, config.enrich_options(), records);
    println!("{}", render_report(&report, format)?);
    Ok(())
}

/// Accepts a bare JSON array or an object with a `structures` array.
pub(crate) fn parse_structure_file(content: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("structures") {
            Some(Value::Array(items)) => Ok(items),
            _ => anyhow::bail!("expected a 'structures' array"),
        },
        _ => anyhow::bail!("expected a JSON array of structures"),
    }
}
