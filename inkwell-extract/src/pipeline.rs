use inkwell_common::{ExtractionResult, InkwellError, Result};
use inkwell_config::{ExtractionConfig, UnrecognizedSourcePolicy};
use inkwell_drivers::{BrowserCookie, LaunchOptions, Launcher, PageScripting, PageSession};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::decoder::{decode_and_persist, PersistedFontAsset};
use crate::resolver::{derive_font_key, ContentResolver, FontFamilyKey};

/// Fonts written for one run.
#[derive(Debug, Clone)]
pub struct FontBatch {
    pub key: FontFamilyKey,
    pub assets: Vec<PersistedFontAsset>,
}

/// Everything one run produced. The text is the caller's to persist.
///
/// Once the container has been read the text is always handed back; a failure in
/// the font stage (no key, no matching rule, a bad source, a write error, or an
/// interrupt) is carried in `fonts`.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub content: ExtractionResult,
    pub fonts: Result<FontBatch>,
}

/// Runs open → resolve content → resolve fonts → decode, one step at a time,
/// and closes the session on every exit path.
pub struct Extractor<L: Launcher> {
    launcher: L,
    options: LaunchOptions,
    resolver: ContentResolver,
    policy: UnrecognizedSourcePolicy,
    cookies: Vec<BrowserCookie>,
}

impl<L: Launcher> Extractor<L> {
    pub fn new(launcher: L, options: LaunchOptions, extraction: &ExtractionConfig) -> Self {
        Self {
            launcher,
            options,
            resolver: ContentResolver::from(extraction),
            policy: extraction.on_unrecognized_source,
            cookies: Vec::new(),
        }
    }

    /// Cookies installed before the container is awaited.
    pub fn with_cookies(mut self, cookies: Vec<BrowserCookie>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Extract text and embedded fonts from `url`, writing fonts into `output_dir`.
    ///
    /// `Err` means no text was obtained. Cancellation is observed before launch, while
    /// the page scripts run, and between font writes; opening itself is bounded by the
    /// launch options' timeouts and always completes so that the browser can be released.
    pub async fn run(
        &self,
        url: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        if cancel.is_cancelled() {
            return Err(InkwellError::Cancelled);
        }

        let session = PageSession::open(
            &self.launcher,
            &self.options,
            url,
            &self.resolver.container_selector,
            &self.cookies,
        )
        .await?;

        let outcome = self.extract(session.page(), output_dir, cancel).await;

        let warnings = session.close().await;
        match &outcome {
            Ok(ExtractionOutcome { fonts: Ok(batch), .. }) => info!(
                target: "pipeline",
                %url,
                fonts = batch.assets.len(),
                teardown_warnings = warnings.len(),
                "extraction finished"
            ),
            Ok(ExtractionOutcome { fonts: Err(err), content }) => warn!(
                target: "pipeline",
                %url,
                lines = content.line_count(),
                error = %err,
                "text extracted, fonts failed"
            ),
            Err(err) => warn!(target: "pipeline", %url, error = %err, "extraction failed"),
        }
        outcome
    }

    async fn extract<P>(
        &self,
        page: &P,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome>
    where
        P: PageScripting + ?Sized,
    {
        // Script evaluations have no side effects, so they can be abandoned mid-flight.
        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(InkwellError::Cancelled),
            content = self.resolver.resolve_content(page) => content?,
        };

        let fonts = self.extract_fonts(page, &content, output_dir, cancel).await;
        Ok(ExtractionOutcome { content, fonts })
    }

    async fn extract_fonts<P>(
        &self,
        page: &P,
        content: &ExtractionResult,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<FontBatch>
    where
        P: PageScripting + ?Sized,
    {
        let key = derive_font_key(content)?;
        let sources = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(InkwellError::Cancelled),
            sources = self.resolver.resolve_font_sources(page, &key) => sources?,
        };
        let assets = decode_and_persist(&sources, output_dir, self.policy, cancel).await?;

        Ok(FontBatch { key, assets })
    }
}
