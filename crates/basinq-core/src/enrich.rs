//! Turns raw extracted structure rows into priced drain basin recommendations.
//!
//! Each record is validated on its own. A bad record becomes a
//! [`StructureFailure`] and the rest of the batch carries on.

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::height::{derive_height, round_up_tier, HeightTier};
use crate::part_code::generate_part_code;
use crate::pricing::quote;
use crate::structure::{
    EnrichedStructure, EnrichmentReport, ExcludedStructure, FailureReason, RawField, RawStructure,
    StructureFailure, StructureFlag,
};

/// Casting descriptions containing this token (any case) are domed.
const DOMED_TOKEN: &str = "domed";

/// What to do with a structure whose rim is at or below its outlet invert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonPositiveHeightPolicy {
    /// Record a `non_positive_height` failure.
    #[default]
    Reject,
    /// Price at the smallest tier and mark with [`StructureFlag::NonPositiveHeight`].
    Flag,
}

impl std::fmt::Display for NonPositiveHeightPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonPositiveHeightPolicy::Reject => write!(f, "reject"),
            NonPositiveHeightPolicy::Flag => write!(f, "flag"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    pub non_positive_height: NonPositiveHeightPolicy,
}

enum Disposition {
    Priced(EnrichedStructure),
    Excluded(String),
}

/// Enrich a batch of typed raw records.
#[must_use]
pub fn enrich(catalog: &Catalog, options: EnrichOptions, raw: &[RawStructure]) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    for (index, record) in raw.iter().enumerate() {
        record_outcome(&mut report, catalog, options, index, record);
    }
    log_summary(&report);
    report
}

/// Enrich a batch of untyped JSON records, as returned by a vision model.
///
/// Values that are not JSON objects fail with `not_an_object`.
#[must_use]
pub fn enrich_values(
    catalog: &Catalog,
    options: EnrichOptions,
    values: Vec<serde_json::Value>,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    for (index, value) in values.into_iter().enumerate() {
        match decode_record(value) {
            Ok(record) => record_outcome(&mut report, catalog, options, index, &record),
            Err(reason) => push_failure(&mut report, index, None, reason),
        }
    }
    log_summary(&report);
    report
}

fn decode_record(value: serde_json::Value) -> Result<RawStructure, FailureReason> {
    if !value.is_object() {
        return Err(FailureReason::NotAnObject);
    }
    serde_json::from_value(value).map_err(|e| FailureReason::UnreadableRecord {
        reason: e.to_string(),
    })
}

fn record_outcome(
    report: &mut EnrichmentReport,
    catalog: &Catalog,
    options: EnrichOptions,
    index: usize,
    record: &RawStructure,
) {
    match enrich_one(catalog, options, record) {
        Ok(Disposition::Priced(structure)) => report.structures.push(structure),
        Ok(Disposition::Excluded(structure_type)) => {
            debug!(index, structure_type = %structure_type, "structure excluded by eligibility filter");
            report.excluded.push(ExcludedStructure {
                index,
                id: record.id_text(),
                structure_type,
            });
        }
        Err(reason) => push_failure(report, index, record.id_text(), reason),
    }
}

fn push_failure(
    report: &mut EnrichmentReport,
    index: usize,
    id: Option<String>,
    reason: FailureReason,
) {
    warn!(index, id = ?id, code = reason.code(), error = %reason, "skipping structure");
    report.failures.push(StructureFailure { index, id, reason });
}

fn log_summary(report: &EnrichmentReport) {
    info!(
        priced = report.structures.len(),
        failed = report.failures.len(),
        excluded = report.excluded.len(),
        "enrichment complete"
    );
}

fn enrich_one(
    catalog: &Catalog,
    options: EnrichOptions,
    record: &RawStructure,
) -> Result<Disposition, FailureReason> {
    let structure_type = record
        .structure_type
        .as_ref()
        .and_then(text_only)
        .ok_or(FailureReason::MissingField { field: "type" })?;
    if !catalog.eligibility.admits(&structure_type) {
        return Ok(Disposition::Excluded(structure_type));
    }

    let id = record
        .id_text()
        .ok_or(FailureReason::MissingField { field: "id" })?;

    let diameter_field = record
        .diameter
        .as_ref()
        .ok_or(FailureReason::MissingField { field: "diameter" })?;
    let diameter =
        parse_diameter(diameter_field).ok_or_else(|| FailureReason::UnparsableDiameter {
            raw: diameter_field.describe(),
        })?;

    let rim = elevation(record.rim.as_ref(), "rim")?;
    let out = elevation(record.out.as_ref(), "out")?;

    let mut flags = Vec::new();
    let height = derive_height(rim, out);
    if !height.is_finite() {
        return Err(FailureReason::HeightOutOfRange { rim, out });
    }
    let tier = if height > 0.0 {
        round_up_tier(height)
    } else {
        match options.non_positive_height {
            NonPositiveHeightPolicy::Reject => {
                return Err(FailureReason::NonPositiveHeight { height });
            }
            NonPositiveHeightPolicy::Flag => {
                flags.push(StructureFlag::NonPositiveHeight);
                HeightTier::Three
            }
        }
    };

    let casting = record
        .casting
        .as_ref()
        .and_then(text_only)
        .ok_or(FailureReason::MalformedCasting)?;
    let domed = casting.to_lowercase().contains(DOMED_TOKEN);

    let price = quote(catalog, diameter, tier, domed);
    if !price.base_resolved {
        flags.push(StructureFlag::Unpriced);
    }

    Ok(Disposition::Priced(EnrichedStructure {
        id,
        diameter,
        height,
        rounded: tier,
        part: generate_part_code(&catalog.part_prefix, diameter, tier),
        price: price.total,
        domed,
        flags,
    }))
}

fn text_only(field: &RawField) -> Option<String> {
    match field {
        RawField::Text(_) => field.as_text(),
        RawField::Number(_) | RawField::Other(_) => None,
    }
}

fn elevation(field: Option<&RawField>, name: &'static str) -> Result<f64, FailureReason> {
    let field = field.ok_or(FailureReason::MissingField { field: name })?;
    field
        .as_number()
        .ok_or_else(|| FailureReason::MalformedElevation {
            field: name,
            raw: field.describe(),
        })
}

/// Nominal diameter in whole inches.
///
/// Strings keep only their leading numeric run, so `24"` and `24 in` read
/// as 24. Fractional or non-positive values are rejected.
fn parse_diameter(field: &RawField) -> Option<u32> {
    let value = match field {
        RawField::Number(n) => *n,
        RawField::Text(s) => {
            let s = s.trim();
            let end = s
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(s.len());
            s[..end].parse::<f64>().ok()?
        }
        RawField::Other(_) => return None,
    };

    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let inches = value as u32;
    Some(inches)
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
