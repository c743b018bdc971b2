//! Structure table extraction from plan images.
//!
//! [`StructureExtractor`] is the seam between the HTTP/CLI layers and the
//! data source: a live vision model or a canned fixture.

pub mod client;
pub mod error;
pub mod extractor;
pub mod parse;
pub mod prompt;
mod retry;
pub mod types;

pub use client::{OpenAiVisionClient, VisionClientOptions};
pub use error::VisionError;
pub use extractor::{build_extractor, FixtureExtractor, PlanImage, StructureExtractor};
pub use parse::extract_structures;
