use anyhow::{Context, Result};
use inkwell_config::InkwellConfig;
use inkwell_drivers::inkwell_browser::cookies::load_cookies;
use inkwell_drivers::{FantocciniLauncher, LaunchOptions, PageSession};
use inkwell_extract::Extractor;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// Run the pipeline, then persist the text it returned.
pub async fn extract(cfg: &InkwellConfig, url: &Url) -> Result<()> {
    let cookies = match &cfg.output.cookies_file {
        Some(path) => load_cookies(path).await,
        None => Vec::new(),
    };

    let extractor = Extractor::new(
        FantocciniLauncher,
        LaunchOptions::from(&cfg.browser),
        &cfg.extraction,
    )
    .with_cookies(cookies);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; closing the browser");
                cancel.cancel();
            }
        })
    };

    let result = extractor
        .run(url.as_str(), &cfg.output.font_dir, &cancel)
        .await;
    interrupt.abort();
    let outcome = result?;

    // The text is saved even when the font stage failed.
    tokio::fs::write(&cfg.output.text_file, &outcome.content.text)
        .await
        .with_context(|| format!("failed to write {}", cfg.output.text_file.display()))?;
    info!(
        path = %cfg.output.text_file.display(),
        lines = outcome.content.line_count(),
        "text saved"
    );
    println!("text: {}", cfg.output.text_file.display());

    let batch = outcome
        .fonts
        .context("text saved, but font extraction failed")?;
    for font in &batch.assets {
        println!("font: {} ({} bytes)", font.path.display(), font.len);
    }
    Ok(())
}

/// Keep a browser open on the persistent profile until Ctrl+C.
pub async fn login(cfg: &InkwellConfig, url: &Url) -> Result<()> {
    let mut options = LaunchOptions::from(&cfg.browser);
    options.headless = false;
    if options.user_data_dir.is_none() {
        warn!("no --app-dir given; the signed-in session will not be kept");
    }

    let session = PageSession::browse(&FantocciniLauncher, &options, url.as_str()).await?;
    println!("Sign in in the browser window, then press Ctrl+C to close it.");

    let waited = tokio::signal::ctrl_c().await;
    let warnings = session.close().await;
    info!(teardown_warnings = warnings.len(), "browser closed");

    waited.context("failed to listen for Ctrl+C")
}
