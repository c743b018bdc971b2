use std::path::Path;

use basinq_core::{enrich_values, Catalog, EnrichOptions};
use serde_json::json;

use super::*;
use crate::analyze::{analyze_plan, media_type_for_path};
use crate::catalog::catalog_table;
use crate::enrich::parse_structure_file;
use crate::output::render_report;

fn sample_report() -> basinq_core::EnrichmentReport {
    let catalog = Catalog::builtin().expect("builtin catalog");
    enrich_values(
        &catalog,
        EnrichOptions::default(),
        vec![
            json!({ "id": "STR-101", "diameter": 12, "rim": 896.80, "out": 895.08,
                    "casting": "DOMED GRATE", "type": "NYLOPLAST DRAIN BASIN" }),
            json!({ "id": "STR-104", "type": "INLINE DRAIN" }),
            json!({ "id": "STR-106", "diameter": "N/A", "rim": 900.0, "out": 898.0,
                    "casting": "SOLID COVER", "type": "NYLOPLAST DRAIN BASIN" }),
        ],
    )
}

fn config_with(vars: &[(&str, &str)]) -> basinq_core::AppConfig {
    let vars: std::collections::HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    build_app_config(|key| vars.get(key).cloned().ok_or(std::env::VarError::NotPresent))
        .expect("valid config")
}

#[tokio::test]
async fn mock_analyze_does_not_need_the_image_file() {
    let config = config_with(&[("BASINQ_EXTRACTION_MODE", "mock")]);
    let catalog = Catalog::builtin().expect("builtin catalog");

    let report = analyze_plan(&config, &catalog, Path::new("/nonexistent/plan.png"))
        .await
        .expect("mock analysis should succeed");

    assert_eq!(report.structures.len(), 4);
    let parts: Vec<&str> = report.structures.iter().map(|s| s.part.as_str()).collect();
    assert_eq!(parts, vec!["2812AG3", "2818AG5", "2818AG5", "2824AG5"]);
}

#[tokio::test]
async fn live_analyze_reports_unreadable_image() {
    let config = config_with(&[
        ("BASINQ_EXTRACTION_MODE", "live"),
        ("OPENAI_API_KEY", "sk-test"),
        ("BASINQ_VISION_BASE_URL", "http://127.0.0.1:9"),
    ]);
    let catalog = Catalog::builtin().expect("builtin catalog");

    let err = analyze_plan(&config, &catalog, Path::new("/nonexistent/plan.png"))
        .await
        .expect_err("missing image must fail in live mode");

    assert!(err.to_string().contains("failed to read plan image"));
}

#[test]
fn parses_analyze_command() {
    let cli = Cli::try_parse_from(["basinq", "analyze", "plan.png"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze {
            ref image,
            mock: false,
            format: OutputFormat::Table
        } if image == Path::new("plan.png")
    ));
    assert!(cli.command.needs_live_extraction());
}

#[test]
fn parses_analyze_mock_json() {
    let cli = Cli::try_parse_from(["basinq", "analyze", "plan.jpg", "--mock", "--format", "json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze {
            mock: true,
            format: OutputFormat::Json,
            ..
        }
    ));
    assert!(!cli.command.needs_live_extraction());
}

#[test]
fn parses_enrich_command() {
    let cli =
        Cli::try_parse_from(["basinq", "enrich", "rows.json"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Enrich { .. }));
    assert!(!cli.command.needs_live_extraction());
}

#[test]
fn parses_catalog_command() {
    let cli = Cli::try_parse_from(["basinq", "catalog", "--format", "json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Catalog {
            format: OutputFormat::Json
        }
    ));
}

#[test]
fn analyze_requires_image_path() {
    assert!(Cli::try_parse_from(["basinq", "analyze"]).is_err());
}

#[test]
fn rejects_unknown_format() {
    assert!(Cli::try_parse_from(["basinq", "catalog", "--format", "csv"]).is_err());
}

#[test]
fn media_type_follows_extension() {
    assert_eq!(media_type_for_path(Path::new("a.png")), Some("image/png"));
    assert_eq!(media_type_for_path(Path::new("a.JPG")), Some("image/jpeg"));
    assert_eq!(media_type_for_path(Path::new("a.jpeg")), Some("image/jpeg"));
    assert_eq!(media_type_for_path(Path::new("a.webp")), Some("image/webp"));
    assert_eq!(media_type_for_path(Path::new("a.tiff")), None);
    assert_eq!(media_type_for_path(Path::new("plan")), None);
}

#[test]
fn structure_file_accepts_bare_array_and_wrapper() {
    let bare = parse_structure_file(r#"[{"id": "A"}, {"id": "B"}]"#).unwrap();
    assert_eq!(bare.len(), 2);

    let wrapped = parse_structure_file(r#"{"structures": [{"id": "A"}]}"#).unwrap();
    assert_eq!(wrapped.len(), 1);
}

#[test]
fn structure_file_rejects_other_shapes() {
    assert!(parse_structure_file(r#"{"rows": []}"#).is_err());
    assert!(parse_structure_file("42").is_err());
    assert!(parse_structure_file("not json").is_err());
}

#[test]
fn table_report_lists_priced_excluded_and_failed() {
    let table = render_report(&sample_report(), OutputFormat::Table).unwrap();

    assert!(table.contains("2812AG3"));
    assert!(table.contains("1.72"));
    assert!(table.contains("TOTAL"));
    assert!(table.contains("750"));
    assert!(table.contains("excluded:"));
    assert!(table.contains("STR-104: INLINE DRAIN"));
    assert!(table.contains("failures:"));
    assert!(table.contains("STR-106"));
}

#[test]
fn json_report_round_trips_through_serde() {
    let rendered = render_report(&sample_report(), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["structures"][0]["part"], "2812AG3");
    assert_eq!(value["structures"][0]["price"].as_f64(), Some(750.0));
    assert_eq!(value["failures"][0]["code"], "unparsable_diameter");
    assert_eq!(value["excluded"][0]["type"], "INLINE DRAIN");
}

#[test]
fn empty_report_renders_placeholder() {
    let rendered =
        render_report(&basinq_core::EnrichmentReport::default(), OutputFormat::Table).unwrap();
    assert_eq!(rendered, "no drain basins priced\n");
}

#[test]
fn catalog_table_shows_every_diameter() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let table = catalog_table(&catalog);

    assert!(table.contains("NYLOPLAST DRAIN BASIN"));
    for diameter in catalog.diameters() {
        assert!(table.lines().any(|l| l.starts_with(&diameter.to_string())));
    }
    assert!(table.contains("DOME"));
}
