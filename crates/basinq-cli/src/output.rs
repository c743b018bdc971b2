//! Plain-text and JSON rendering of enrichment results.

use std::fmt::Write as _;

use basinq_core::{EnrichmentReport, StructureFlag};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

/// Render `report` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn render_report(
    report: &EnrichmentReport,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => Ok(report_table(report)),
    }
}

fn report_table(report: &EnrichmentReport) -> String {
    let mut out = String::new();

    if report.structures.is_empty() {
        out.push_str("no drain basins priced\n");
    } else {
        let _ = writeln!(
            out,
            "{:<12}{:<6}{:<9}{:<6}{:<11}{:>10}  {:<7}FLAGS",
            "ID", "DIA", "HEIGHT", "TIER", "PART", "PRICE", "DOMED"
        );
        for s in &report.structures {
            let flags = s
                .flags
                .iter()
                .map(|f| flag_label(*f))
                .collect::<Vec<_>>()
                .join(",");
            let tier = s.rounded.to_string();
            let price = s.price.to_string();
            let _ = writeln!(
                out,
                "{:<12}{:<6}{:<9.2}{:<6}{:<11}{:>10}  {:<7}{}",
                s.id,
                s.diameter,
                s.height,
                tier,
                s.part,
                price,
                if s.domed { "yes" } else { "no" },
                flags
            );
        }
        let total = report.total_price().to_string();
        let _ = writeln!(out, "{:<44}{total:>10}", "TOTAL");
    }

    if !report.excluded.is_empty() {
        out.push_str("\nexcluded:\n");
        for e in &report.excluded {
            let _ = writeln!(
                out,
                "  #{} {}: {}",
                e.index,
                e.id.as_deref().unwrap_or("-"),
                e.structure_type
            );
        }
    }

    if !report.failures.is_empty() {
        out.push_str("\nfailures:\n");
        for f in &report.failures {
            let _ = writeln!(
                out,
                "  #{} {}: {}",
                f.index,
                f.id.as_deref().unwrap_or("-"),
                f.reason
            );
        }
    }

    out
}

fn flag_label(flag: StructureFlag) -> &'static str {
    match flag {
        StructureFlag::Unpriced => "unpriced",
        StructureFlag::NonPositiveHeight => "non-positive-height",
    }
}
