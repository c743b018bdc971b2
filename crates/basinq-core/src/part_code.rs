use crate::height::HeightTier;

/// Fixed token between the diameter and the height tier in a part code.
pub const PART_CODE_INFIX: &str = "AG";

/// Build the catalog part code `<prefix><diameter>AG<tier>`, e.g. `2812AG3`.
#[must_use]
pub fn generate_part_code(prefix: &str, diameter: u32, tier: HeightTier) -> String {
    format!("{prefix}{diameter}{PART_CODE_INFIX}{}", tier.feet())
}
