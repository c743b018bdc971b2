//! Drain basin enrichment and pricing engine.
//!
//! Takes structure rows extracted from site plans and turns them into priced
//! catalog recommendations: derived height, height tier, part code, price.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod height;
pub mod part_code;
pub mod pricing;
pub mod structure;

pub use app_config::{AppConfig, Environment, ExtractionMode};
pub use catalog::{load_catalog, Catalog, EligibilityPolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use enrich::{enrich, enrich_values, EnrichOptions, NonPositiveHeightPolicy};
pub use error::ConfigError;
pub use height::{derive_height, round_up_tier, HeightTier};
pub use part_code::generate_part_code;
pub use pricing::{quote, resolve_price, PriceQuote};
pub use structure::{
    EnrichedStructure, EnrichmentReport, ExcludedStructure, FailureReason, RawField, RawStructure,
    StructureFailure, StructureFlag,
};
