//! Content & Font Resolver: reads the container and the style sheets of the live page.
use inkwell_common::{ExtractionResult, InkwellError, Result};
use inkwell_config::{ExtractionConfig, FontFamilySource};
use inkwell_drivers::PageScripting;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, info};

use crate::scripts::{content_function, FONT_SOURCES_SCRIPT};

/// First family of the container's `font-family` list, unquoted and trimmed. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamilyKey(String);

impl FontFamilyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontFamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the lookup key from `result.font_family`: the text before the first comma.
///
/// ```
/// use inkwell_common::ExtractionResult;
/// use inkwell_extract::derive_font_key;
///
/// let result = ExtractionResult { text: String::new(), font_family: " A , B, C".into() };
/// assert_eq!(derive_font_key(&result).unwrap().as_str(), "A");
/// ```
pub fn derive_font_key(result: &ExtractionResult) -> Result<FontFamilyKey> {
    let first = result.font_family.split(',').next().unwrap_or_default();
    // Rule families are compared with their quotes stripped, so the key is too.
    let key = first.trim().trim_matches(|c| c == '"' || c == '\'').trim();

    if key.is_empty() {
        return Err(InkwellError::MissingFontKey {
            font_family: result.font_family.clone(),
        });
    }
    Ok(FontFamilyKey(key.to_string()))
}

/// Evaluates the content and font-source scripts against a ready page.
#[derive(Debug, Clone)]
pub struct ContentResolver {
    pub container_selector: String,
    pub text_selector: String,
    pub font_family_source: FontFamilySource,
}

impl Default for ContentResolver {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for ContentResolver {
    fn from(cfg: &ExtractionConfig) -> Self {
        Self {
            container_selector: cfg.container_selector.clone(),
            text_selector: cfg.text_selector.clone(),
            font_family_source: cfg.font_family_source,
        }
    }
}

impl ContentResolver {
    /// Read the container's text and declared font family.
    ///
    /// A script failure, a vanished container, or a malformed result all mean the
    /// page gave us no content.
    pub async fn resolve_content<P>(&self, page: &P) -> Result<ExtractionResult>
    where
        P: PageScripting + ?Sized,
    {
        let function = content_function(&self.text_selector, self.font_family_source);
        let value = page
            .evaluate_on_selector(&self.container_selector, &function)
            .await
            .map_err(|e| self.empty(format!("content script failed: {e:#}")))?;

        if value.is_null() {
            return Err(self.empty("container produced no result object".to_string()));
        }

        let result: ExtractionResult = serde_json::from_value(value)
            .map_err(|e| self.empty(format!("unexpected result shape: {e}")))?;

        info!(
            target: "resolver",
            lines = result.line_count(),
            font_family = %result.font_family,
            "content resolved"
        );
        Ok(result)
    }

    /// Collect the raw `src` of every accessible `@font-face` rule declaring `key`.
    pub async fn resolve_font_sources<P>(&self, page: &P, key: &FontFamilyKey) -> Result<Vec<String>>
    where
        P: PageScripting + ?Sized,
    {
        let value = page
            .evaluate(FONT_SOURCES_SCRIPT, vec![json!(key.as_str())])
            .await?;

        let sources: Vec<String> = match value {
            Value::Null => Vec::new(),
            other => serde_json::from_value(other).map_err(|e| {
                InkwellError::Driver(
                    anyhow::Error::from(e).context("font source scan returned unexpected data"),
                )
            })?,
        };

        if sources.is_empty() {
            return Err(InkwellError::NoFontFaceMatch {
                key: key.to_string(),
            });
        }

        debug!(target: "resolver", %key, count = sources.len(), "font sources resolved");
        Ok(sources)
    }

    fn empty(&self, detail: String) -> InkwellError {
        InkwellError::EmptyContent {
            selector: self.container_selector.clone(),
            detail,
        }
    }
}
