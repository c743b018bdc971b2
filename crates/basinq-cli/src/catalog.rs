use std::fmt::Write as _;

use basinq_core::{Catalog, HeightTier};

use crate::output::OutputFormat;

/// Print the active catalog's price tables.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn run_catalog(catalog: &Catalog, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
        OutputFormat::Table => print!("{}", catalog_table(catalog)),
    }
    Ok(())
}

pub(crate) fn catalog_table(catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (part prefix {})",
        catalog.family, catalog.part_prefix
    );
    let _ = write!(out, "{:<6}", "DIA");
    for tier in HeightTier::ALL {
        let _ = write!(out, "{:>8}", format!("{tier} FT"));
    }
    let _ = writeln!(out, "{:>8}", "DOME");

    for diameter in catalog.diameters() {
        let _ = write!(out, "{diameter:<6}");
        for tier in HeightTier::ALL {
            let price = catalog
                .base_price(diameter, tier)
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            let _ = write!(out, "{price:>8}");
        }
        let dome = catalog
            .dome_surcharge(diameter)
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let _ = writeln!(out, "{dome:>8}");
    }

    let _ = writeln!(
        out,
        "eligible: type contains '{}'; excluded: {}",
        catalog.eligibility.marker,
        if catalog.eligibility.excluded.is_empty() {
            "none".to_string()
        } else {
            catalog.eligibility.excluded.join(", ")
        }
    );
    out
}
