//! Basin height derivation and catalog height tiers.

use serde::{Deserialize, Serialize};

/// Manufactured catalog height class, in feet.
///
/// Ordered ascending. [`HeightTier::Ten`] is also the overflow bucket for
/// anything taller than seven feet; there is no tier beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeightTier {
    Three,
    Five,
    Seven,
    Ten,
}

impl HeightTier {
    /// All tiers, smallest first.
    pub const ALL: [HeightTier; 4] = [
        HeightTier::Three,
        HeightTier::Five,
        HeightTier::Seven,
        HeightTier::Ten,
    ];

    #[must_use]
    pub fn feet(self) -> u8 {
        match self {
            HeightTier::Three => 3,
            HeightTier::Five => 5,
            HeightTier::Seven => 7,
            HeightTier::Ten => 10,
        }
    }
}

impl std::fmt::Display for HeightTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.feet())
    }
}

impl TryFrom<u8> for HeightTier {
    type Error = String;

    fn try_from(feet: u8) -> Result<Self, Self::Error> {
        match feet {
            3 => Ok(HeightTier::Three),
            5 => Ok(HeightTier::Five),
            7 => Ok(HeightTier::Seven),
            10 => Ok(HeightTier::Ten),
            other => Err(format!(
                "unsupported height tier {other}; must be 3, 5, 7, or 10"
            )),
        }
    }
}

impl From<HeightTier> for u8 {
    fn from(tier: HeightTier) -> Self {
        tier.feet()
    }
}

/// Height of a basin from rim elevation down to outlet invert, in feet,
/// rounded to two decimal places (half away from zero).
///
/// No validation happens here: an invert above the rim yields a negative
/// height and it is up to the caller to decide what that means.
#[must_use]
pub fn derive_height(rim: f64, out: f64) -> f64 {
    round_to_hundredths(rim - out)
}

/// Smallest tier that holds `height`, or [`HeightTier::Ten`] when the height
/// exceeds every tier.
///
/// Non-positive heights map to [`HeightTier::Three`].
#[must_use]
pub fn round_up_tier(height: f64) -> HeightTier {
    HeightTier::ALL
        .into_iter()
        .find(|tier| height <= f64::from(tier.feet()))
        .unwrap_or(HeightTier::Ten)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_height_rounds_to_hundredths() {
        assert!((derive_height(896.80, 895.08) - 1.72).abs() < f64::EPSILON);
    }

    #[test]
    fn derive_height_is_reproducible() {
        let a = derive_height(899.71, 895.19);
        let b = derive_height(899.71, 895.19);
        assert!((a - b).abs() < f64::EPSILON);
        assert!((a - 4.52).abs() < f64::EPSILON);
    }

    #[test]
    fn derive_height_rounds_half_away_from_zero() {
        assert!((round_to_hundredths(2.125) - 2.13).abs() < 1e-9);
        assert!((round_to_hundredths(-2.125) + 2.13).abs() < 1e-9);
    }

    #[test]
    fn derive_height_negative_when_invert_above_rim() {
        assert!((derive_height(890.00, 891.50) + 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn round_up_tier_boundaries() {
        assert_eq!(round_up_tier(3.0), HeightTier::Three);
        assert_eq!(round_up_tier(3.01), HeightTier::Five);
        assert_eq!(round_up_tier(5.0), HeightTier::Five);
        assert_eq!(round_up_tier(7.0), HeightTier::Seven);
        assert_eq!(round_up_tier(7.01), HeightTier::Ten);
        assert_eq!(round_up_tier(10.0), HeightTier::Ten);
        assert_eq!(round_up_tier(100.0), HeightTier::Ten);
    }

    #[test]
    fn round_up_tier_non_positive_maps_to_smallest() {
        assert_eq!(round_up_tier(0.0), HeightTier::Three);
        assert_eq!(round_up_tier(-4.2), HeightTier::Three);
    }

    #[test]
    fn round_up_tier_is_monotonic() {
        let mut previous = round_up_tier(-1.0);
        for step in 0..1_500 {
            let height = f64::from(step) * 0.01;
            let tier = round_up_tier(height);
            assert!(tier >= previous, "tier decreased at height {height}");
            previous = tier;
        }
    }

    #[test]
    fn tier_try_from_rejects_unknown_feet() {
        assert_eq!(HeightTier::try_from(7), Ok(HeightTier::Seven));
        assert!(HeightTier::try_from(4).is_err());
    }
}
