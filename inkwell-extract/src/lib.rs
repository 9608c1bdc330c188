//! Text and embedded-font extraction from a single rendered page.
//!
//! The pipeline runs strictly in sequence inside one browser session:
//!
//! 1. [`PageSession`](inkwell_drivers::PageSession) opens the page and waits for the container,
//! 2. [`resolver::ContentResolver`] reads the container's text and `font-family`, then collects
//!    the `src` of every matching `@font-face` rule,
//! 3. [`decoder::decode_and_persist`] turns embedded data URIs into `font_<i>.<ext>` files.
//!
//! [`pipeline::Extractor`] ties the steps together and guarantees the session is closed.
pub mod decoder;
pub mod pipeline;
pub mod resolver;
pub mod scripts;

pub use decoder::{decode_and_persist, parse_font_source, DecodedFontAsset, PersistedFontAsset};
pub use pipeline::{ExtractionOutcome, Extractor, FontBatch};
pub use resolver::{derive_font_key, ContentResolver, FontFamilyKey};
