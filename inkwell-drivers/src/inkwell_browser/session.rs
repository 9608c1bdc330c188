//! Page Session Manager: exclusive ownership of one browser + page, from
//! launch to guaranteed release.
//!
//! Async code has no async `Drop`, so release is an explicit step: callers run
//! their work against [`PageSession::page`] and then call [`PageSession::close`]
//! on every exit path. [`PageSession::open`] already releases everything itself
//! when it fails after the browser was launched.
use inkwell_common::{InkwellError, Result, TeardownStep, TeardownWarning};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::capability::{AutomationBackend, LaunchOptions, Launcher};
use super::cookies::BrowserCookie;

pub struct PageSession<B: AutomationBackend> {
    backend: B,
    url: String,
    selector_timeout: Duration,
}

impl<B: AutomationBackend> PageSession<B> {
    /// Launch a browser, navigate to `url`, and wait until `selector` exists.
    ///
    /// When `cookies` is non-empty they are installed after the first navigation
    /// and the page is loaded again so they take effect.
    pub async fn open<L>(
        launcher: &L,
        options: &LaunchOptions,
        url: &str,
        selector: &str,
        cookies: &[BrowserCookie],
    ) -> Result<Self>
    where
        L: Launcher<Backend = B>,
    {
        let session = Self::launch(launcher, options, url).await?;
        match session.prepare(selector, cookies).await {
            Ok(()) => Ok(session),
            Err(err) => {
                session.close().await;
                Err(err)
            }
        }
    }

    /// Launch a browser and navigate to `url` without waiting for any element.
    pub async fn browse<L>(launcher: &L, options: &LaunchOptions, url: &str) -> Result<Self>
    where
        L: Launcher<Backend = B>,
    {
        let session = Self::launch(launcher, options, url).await?;
        match session.navigate().await {
            Ok(()) => Ok(session),
            Err(err) => {
                session.close().await;
                Err(err)
            }
        }
    }

    async fn launch<L>(launcher: &L, options: &LaunchOptions, url: &str) -> Result<Self>
    where
        L: Launcher<Backend = B>,
    {
        Url::parse(url).map_err(|e| InkwellError::Navigation {
            url: url.to_string(),
            source: anyhow::Error::from(e).context("invalid url"),
        })?;

        let backend = launcher.launch(options).await?;
        Ok(Self {
            backend,
            url: url.to_string(),
            selector_timeout: options.selector_timeout,
        })
    }

    async fn prepare(&self, selector: &str, cookies: &[BrowserCookie]) -> Result<()> {
        self.navigate().await?;

        if !cookies.is_empty() {
            self.backend.add_cookies(cookies).await?;
            info!(target: "session", count = cookies.len(), "cookies installed; reloading");
            self.navigate().await?;
        }

        self.backend
            .wait_for_selector(selector, self.selector_timeout)
            .await
            .map_err(|source| InkwellError::ContainerNotFound {
                url: self.url.clone(),
                selector: selector.to_string(),
                source,
            })?;

        info!(target: "session", url = %self.url, %selector, "page ready");
        Ok(())
    }

    async fn navigate(&self) -> Result<()> {
        self.backend
            .goto(&self.url)
            .await
            .map_err(|source| InkwellError::Navigation {
                url: self.url.clone(),
                source,
            })
    }

    /// The live page, for in-page script evaluation.
    pub fn page(&self) -> &B {
        &self.backend
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Close the page, then the browser, then stop the automation process.
    ///
    /// Every step is attempted regardless of earlier failures. Failures are logged and
    /// returned as warnings; they never become errors.
    pub async fn close(mut self) -> Vec<TeardownWarning> {
        let mut warnings = Vec::new();

        if let Err(error) = self.backend.close_page().await {
            warnings.push(TeardownWarning {
                step: TeardownStep::ClosePage,
                error,
            });
        }
        if let Err(error) = self.backend.close_browser().await {
            warnings.push(TeardownWarning {
                step: TeardownStep::CloseBrowser,
                error,
            });
        }
        if let Err(error) = self.backend.stop().await {
            warnings.push(TeardownWarning {
                step: TeardownStep::StopProcess,
                error,
            });
        }

        for warning in &warnings {
            warn!(target: "session.teardown", step = %warning.step, error = %warning.error, "teardown step failed");
        }
        info!(target: "session", url = %self.url, warnings = warnings.len(), "session closed");
        warnings
    }
}
