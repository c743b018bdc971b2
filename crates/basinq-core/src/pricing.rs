//! Price resolution against the catalog tables.
//!
//! Lookups outside the declared diameters are not errors: the base price
//! falls back to zero so one unpriceable structure never blocks the rest of
//! a take-off.

use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::height::HeightTier;

/// Outcome of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Base price plus any domed-casting surcharge.
    pub total: Decimal,
    /// `false` when the diameter/tier pair is absent from the base table
    /// and the base price fell back to zero.
    pub base_resolved: bool,
}

/// Price a basin, reporting whether the base table covered it.
#[must_use]
pub fn quote(catalog: &Catalog, diameter: u32, tier: HeightTier, domed: bool) -> PriceQuote {
    let base = catalog.base_price(diameter, tier);
    let surcharge = if domed {
        catalog.dome_surcharge(diameter).unwrap_or_default()
    } else {
        Decimal::ZERO
    };

    PriceQuote {
        total: base.unwrap_or_default() + surcharge,
        base_resolved: base.is_some(),
    }
}

/// Total price for a basin: base price for the diameter and tier, plus the
/// dome surcharge when `domed`. Unknown diameters price at zero.
#[must_use]
pub fn resolve_price(catalog: &Catalog, diameter: u32, tier: HeightTier, domed: bool) -> Decimal {
    quote(catalog, diameter, tier, domed).total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("builtin catalog")
    }

    #[test]
    fn plain_price_matches_base_table_everywhere() {
        let catalog = catalog();
        for diameter in catalog.diameters() {
            for tier in HeightTier::ALL {
                assert_eq!(
                    resolve_price(&catalog, diameter, tier, false),
                    catalog.base_price(diameter, tier).unwrap()
                );
            }
        }
    }

    #[test]
    fn domed_price_adds_surcharge_everywhere() {
        let catalog = catalog();
        for diameter in catalog.diameters() {
            for tier in HeightTier::ALL {
                let expected = catalog.base_price(diameter, tier).unwrap()
                    + catalog.dome_surcharge(diameter).unwrap_or_default();
                assert_eq!(resolve_price(&catalog, diameter, tier, true), expected);
            }
        }
    }

    #[test]
    fn domed_twelve_inch_three_foot() {
        // 600 base + 150 dome
        let price = resolve_price(&catalog(), 12, HeightTier::Three, true);
        assert_eq!(price, Decimal::from(750));
    }

    #[test]
    fn diameter_without_surcharge_prices_at_base() {
        let price = resolve_price(&catalog(), 36, HeightTier::Five, true);
        assert_eq!(price, Decimal::from(1110));
    }

    #[test]
    fn unknown_diameter_prices_at_zero() {
        let result = quote(&catalog(), 42, HeightTier::Seven, true);
        assert_eq!(result.total, Decimal::ZERO);
        assert!(!result.base_resolved);
    }

    #[test]
    fn known_diameter_reports_resolved() {
        let result = quote(&catalog(), 18, HeightTier::Ten, false);
        assert_eq!(result.total, Decimal::from(830));
        assert!(result.base_resolved);
    }
}
