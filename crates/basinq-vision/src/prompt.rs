pub const SYSTEM_PROMPT: &str = "You are an assistant that extracts storm drain structure info \
from civil engineering plan tables.";

pub const EXTRACTION_PROMPT: &str = r#"Analyze the image of a storm structure data table.
Extract a list of structures with these properties:
- id (e.g., STR-101)
- casting
- diameter (number only)
- rim (RIM ELEV)
- out (PIPE INV (OUT))
- type (e.g., NYLOPLAST DRAIN BASIN)

Only include entries with "NYLOPLAST DRAIN BASIN" in the type field.
Exclude rows labeled "INLINE DRAIN" or "FLARED END".

Return only a JSON array of objects with the above fields, with no commentary."#;
