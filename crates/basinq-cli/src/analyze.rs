use std::path::Path;

use anyhow::Context;
use base64::Engine as _;
use basinq_core::{enrich_values, AppConfig, Catalog, EnrichmentReport, ExtractionMode};
use basinq_vision::{build_extractor, PlanImage};

use crate::output::{render_report, OutputFormat};

/// Extract structures from the plan image at `path` and print the priced report.
///
/// # Errors
///
/// Returns an error if the image cannot be read, the extractor cannot be
/// built, or extraction fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    catalog: &Catalog,
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = analyze_plan(config, catalog, path).await?;
    println!("{}", render_report(&report, format)?);
    Ok(())
}

/// Runs extraction and enrichment for one plan image.
///
/// The fixture extractor ignores its input, so in mock mode the file is never
/// read and need not exist.
pub(crate) async fn analyze_plan(
    config: &AppConfig,
    catalog: &Catalog,
    path: &Path,
) -> anyhow::Result<EnrichmentReport> {
    let extractor = build_extractor(config)?;
    let image = match extractor.mode() {
        ExtractionMode::Mock => None,
        ExtractionMode::Live => Some(load_plan_image(path).await?),
    };

    tracing::info!(
        path = %path.display(),
        mode = %extractor.mode(),
        "analyzing plan image"
    );
    let records = extractor.extract(image.as_ref()).await?;
    Ok(enrich_values(catalog, config.enrich_options(), records))
}

async fn load_plan_image(path: &Path) -> anyhow::Result<PlanImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read plan image {}", path.display()))?;
    tracing::debug!(bytes = bytes.len(), "read plan image");
    Ok(PlanImage::new(
        base64::engine::general_purpose::STANDARD.encode(&bytes),
        media_type_for_path(path),
    ))
}

/// Image media type from the file extension. Unknown extensions fall back to
/// the extractor's default.
pub(crate) fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
