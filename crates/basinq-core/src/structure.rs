use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::height::HeightTier;

/// A single field value as it arrived from the recognition service.
///
/// Vision models are inconsistent about quoting numbers, so every field is
/// kept loosely typed until the enrichment pipeline validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    /// Anything else (booleans, arrays, objects). Always rejected downstream.
    Other(serde_json::Value),
}

impl RawField {
    /// Text content, trimmed. Numbers are rendered as text; empty strings and
    /// non-scalar values yield `None`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawField::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            RawField::Number(n) => Some(n.to_string()),
            RawField::Other(_) => None,
        }
    }

    /// Numeric value. Numeric strings such as `"896.80"` are accepted.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawField::Number(n) => *n,
            RawField::Text(s) => s.trim().parse::<f64>().ok()?,
            RawField::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Rendering used in failure messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s.clone(),
            RawField::Other(v) => v.to_string(),
        }
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_owned())
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

/// A drain structure row extracted from a plan's structure table.
///
/// Both the snake_case keys requested by the extraction prompt and the
/// column headings printed on typical plan sheets are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStructure {
    #[serde(default, alias = "structure_id", alias = "Structure ID")]
    pub id: Option<RawField>,
    /// Nominal diameter in inches.
    #[serde(default, alias = "Diameter")]
    pub diameter: Option<RawField>,
    /// Rim elevation in feet.
    #[serde(
        default,
        alias = "rim_elevation",
        alias = "Rim Elevation",
        alias = "RIM ELEV"
    )]
    pub rim: Option<RawField>,
    /// Outlet invert elevation in feet.
    #[serde(
        default,
        alias = "outlet_invert",
        alias = "Outlet Invert Elevation",
        alias = "PIPE INV (OUT)"
    )]
    pub out: Option<RawField>,
    /// Casting description, e.g. `"DOMED GRATE"` or `"SOLID COVER"`.
    #[serde(default, alias = "Casting")]
    pub casting: Option<RawField>,
    /// Structure type, e.g. `"NYLOPLAST DRAIN BASIN"`.
    #[serde(default, rename = "type", alias = "structure_type", alias = "Type")]
    pub structure_type: Option<RawField>,
}

impl RawStructure {
    /// Structure id as text, if present.
    #[must_use]
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().and_then(RawField::as_text)
    }
}

/// Advisory marker on a priced structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureFlag {
    /// Diameter/tier absent from the base price table; price fell back to zero.
    Unpriced,
    /// Rim at or below the outlet invert; kept at the smallest tier.
    NonPositiveHeight,
}

/// A priced drain basin recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedStructure {
    pub id: String,
    /// Nominal diameter in inches.
    pub diameter: u32,
    /// Rim minus outlet invert, feet, two decimals.
    pub height: f64,
    /// Catalog height tier the basin rounds up to.
    pub rounded: HeightTier,
    /// Catalog part code, e.g. `"2812AG3"`.
    pub part: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub domed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<StructureFlag>,
}

/// Why a single record could not be priced.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record could not be read: {reason}")]
    UnreadableRecord { reason: String },

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("diameter '{raw}' is not a whole number of inches")]
    UnparsableDiameter { raw: String },

    #[error("{field} elevation '{raw}' is not a number")]
    MalformedElevation { field: &'static str, raw: String },

    #[error("casting description is missing or not text")]
    MalformedCasting,

    #[error("derived height {height} ft is not positive")]
    NonPositiveHeight { height: f64 },

    #[error("rim {rim} and out {out} do not yield a finite height")]
    HeightOutOfRange { rim: f64, out: f64 },
}

impl FailureReason {
    /// Stable machine-readable code, matching the serialized `code` tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::NotAnObject => "not_an_object",
            FailureReason::UnreadableRecord { .. } => "unreadable_record",
            FailureReason::MissingField { .. } => "missing_field",
            FailureReason::UnparsableDiameter { .. } => "unparsable_diameter",
            FailureReason::MalformedElevation { .. } => "malformed_elevation",
            FailureReason::MalformedCasting => "malformed_casting",
            FailureReason::NonPositiveHeight { .. } => "non_positive_height",
            FailureReason::HeightOutOfRange { .. } => "height_out_of_range",
        }
    }
}

/// A record that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureFailure {
    /// Position of the record in the input sequence.
    pub index: usize,
    pub id: Option<String>,
    #[serde(flatten)]
    pub reason: FailureReason,
}

/// A record removed by the catalog's eligibility filter. Not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedStructure {
    pub index: usize,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub structure_type: String,
}

/// Result of enriching one batch of extracted records.
///
/// Every input record appears in exactly one of the three lists, each in
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentReport {
    pub structures: Vec<EnrichedStructure>,
    pub failures: Vec<StructureFailure>,
    pub excluded: Vec<ExcludedStructure>,
}

impl EnrichmentReport {
    /// Number of input records accounted for by this report.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.structures.len() + self.failures.len() + self.excluded.len()
    }

    /// Sum of all structure prices.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.structures.iter().map(|s| s.price).sum()
    }
}
