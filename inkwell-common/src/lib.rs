//! Common types and utilities shared across Inkwell crates.
//!
//! This crate defines the extraction data model, the error taxonomy, and
//! observability helpers used throughout the Inkwell workspace. It is kept
//! dependency‑minimal so that every crate can depend on it cheaply.
//!
//! # Overview
//!
//! - [`ExtractionResult`]: text and declared font family read from the content container
//! - [`InkwellError`] and [`Result`]: terminal errors of one extraction run
//! - [`TeardownWarning`]: non‑fatal failures while releasing browser resources
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use inkwell_common::ExtractionResult;
//!
//! let raw = serde_json::json!({ "text": "Title\n\nBody", "fontFamily": "Secret, serif" });
//! let result: ExtractionResult = serde_json::from_value(raw).unwrap();
//! assert_eq!(result.line_count(), 3);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod observability;

/// Text and font family read from the content container in one in‑page evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Trimmed text of every heading/paragraph descendant, newline‑joined in document order.
    pub text: String,
    /// Raw CSS `font-family` value of the container, possibly a fallback list.
    #[serde(default)]
    pub font_family: String,
}

impl ExtractionResult {
    /// Number of lines, including the empty ones contributed by empty elements.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Error types for one extraction run. Every variant is terminal.
#[derive(thiserror::Error, Debug)]
pub enum InkwellError {
    /// The page never reached its load state.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The content container did not appear within the wait window.
    #[error("content container `{selector}` not found on {url}: {source}")]
    ContainerNotFound {
        url: String,
        selector: String,
        #[source]
        source: anyhow::Error,
    },

    /// The content evaluation produced no result object.
    #[error("no content returned from `{selector}`: {detail}")]
    EmptyContent { selector: String, detail: String },

    /// The declared font family yields an empty key.
    #[error("font-family {font_family:?} yields no usable font key")]
    MissingFontKey { font_family: String },

    /// No accessible `@font-face` rule declares the derived family.
    #[error("no @font-face rule matches font-family `{key}`")]
    NoFontFaceMatch { key: String },

    /// A matched `src` value is not an embedded font data URI.
    #[error("font source #{index} is not an embedded font data URI: {}", abbreviate(.declaration))]
    UnrecognizedFontSource { index: usize, declaration: String },

    /// A matched data URI carries a payload that is not valid base64.
    #[error("font source #{index} carries an undecodable base64 payload: {source}")]
    InvalidFontPayload {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },

    /// Creating the output directory or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A driver (browser launch, script transport) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was interrupted before it finished.
    #[error("extraction cancelled")]
    Cancelled,
}

/// Convenient alias for results that use [`InkwellError`].
pub type Result<T> = std::result::Result<T, InkwellError>;

const DECLARATION_PREVIEW_CHARS: usize = 96;

/// Shorten long declarations (base64 payloads can run to megabytes) for display.
pub fn abbreviate(declaration: &str) -> String {
    let mut chars = declaration.chars();
    let head: String = chars.by_ref().take(DECLARATION_PREVIEW_CHARS).collect();
    match chars.count() {
        0 => head,
        rest => format!("{head}… ({rest} more chars)"),
    }
}

/// Release step during session teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    ClosePage,
    CloseBrowser,
    StopProcess,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeardownStep::ClosePage => "close page",
            TeardownStep::CloseBrowser => "close browser",
            TeardownStep::StopProcess => "stop automation process",
        };
        f.write_str(name)
    }
}

/// Non‑fatal failure of one teardown step. Logged, never propagated.
#[derive(thiserror::Error, Debug)]
#[error("teardown step `{step}` failed: {error}")]
pub struct TeardownWarning {
    pub step: TeardownStep,
    pub error: anyhow::Error,
}
