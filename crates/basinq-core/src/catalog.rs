use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::height::HeightTier;
use crate::ConfigError;

/// Catalog shipped with the crate, used when no catalog path is configured.
const BUILTIN_CATALOG: &str = include_str!("../catalog/nyloplast.yaml");

/// Which extracted structure types the catalog can price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    /// Product-family marker that must appear in the structure type,
    /// e.g. `"NYLOPLAST DRAIN BASIN"`.
    pub marker: String,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Categories that are never priced even when the marker matches,
    /// e.g. `"INLINE DRAIN"`.
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl EligibilityPolicy {
    /// Returns `true` if `structure_type` carries the marker and names none of
    /// the excluded categories.
    #[must_use]
    pub fn admits(&self, structure_type: &str) -> bool {
        let contains = |haystack: &str, needle: &str| {
            if self.case_sensitive {
                haystack.contains(needle)
            } else {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
        };

        contains(structure_type, &self.marker)
            && !self
                .excluded
                .iter()
                .any(|category| contains(structure_type, category))
    }
}

/// Pricing tables for one drain basin product family.
///
/// Loaded once at startup and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub family: String,
    /// Leading digits of every generated part code.
    pub part_prefix: String,
    /// Base price keyed by nominal diameter (inches), then height tier.
    pub base_prices: BTreeMap<u32, BTreeMap<HeightTier, Decimal>>,
    /// Domed-casting surcharge keyed by nominal diameter. Absent means zero.
    #[serde(default)]
    pub dome_surcharges: BTreeMap<u32, Decimal>,
    pub eligibility: EligibilityPolicy,
}

impl Catalog {
    /// Parse and validate the catalog embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only if the embedded file is corrupt.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CatalogFileParse`] on malformed YAML and
    /// [`ConfigError::Validation`] if the tables are incomplete or inconsistent.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_yaml::from_str(yaml).map_err(ConfigError::CatalogFileParse)?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    #[must_use]
    pub fn base_price(&self, diameter: u32, tier: HeightTier) -> Option<Decimal> {
        self.base_prices
            .get(&diameter)
            .and_then(|tiers| tiers.get(&tier))
            .copied()
    }

    #[must_use]
    pub fn dome_surcharge(&self, diameter: u32) -> Option<Decimal> {
        self.dome_surcharges.get(&diameter).copied()
    }

    /// Declared diameters, ascending.
    #[must_use]
    pub fn diameters(&self) -> Vec<u32> {
        self.base_prices.keys().copied().collect()
    }
}

/// Load the catalog from `path`, or the built-in catalog when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, ConfigError> {
    let Some(path) = path else {
        return Catalog::builtin();
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    Catalog::from_yaml_str(&content)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    if catalog.part_prefix.is_empty()
        || !catalog
            .part_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "part_prefix '{}' must be non-empty and alphanumeric",
            catalog.part_prefix
        )));
    }

    if catalog.eligibility.marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "eligibility marker must be non-empty".to_string(),
        ));
    }

    if catalog.base_prices.is_empty() {
        return Err(ConfigError::Validation(
            "base_prices must declare at least one diameter".to_string(),
        ));
    }

    let all_tiers: BTreeSet<HeightTier> = HeightTier::ALL.into_iter().collect();

    for (diameter, tiers) in &catalog.base_prices {
        if *diameter == 0 {
            return Err(ConfigError::Validation(
                "diameter 0 is not a valid catalog diameter".to_string(),
            ));
        }

        let declared: BTreeSet<HeightTier> = tiers.keys().copied().collect();
        if let Some(missing) = all_tiers.difference(&declared).next() {
            return Err(ConfigError::Validation(format!(
                "diameter {diameter} is missing a price for the {missing} ft tier"
            )));
        }

        if let Some((tier, price)) = tiers.iter().find(|(_, price)| price.is_sign_negative()) {
            return Err(ConfigError::Validation(format!(
                "diameter {diameter} has negative price {price} for the {tier} ft tier"
            )));
        }
    }

    for (diameter, surcharge) in &catalog.dome_surcharges {
        if !catalog.base_prices.contains_key(diameter) {
            return Err(ConfigError::Validation(format!(
                "dome surcharge declared for unknown diameter {diameter}"
            )));
        }
        if surcharge.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "diameter {diameter} has negative dome surcharge {surcharge}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
