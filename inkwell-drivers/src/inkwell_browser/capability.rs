//! The browser automation capability, as consumed by the session manager and
//! the resolver. Implemented by [`super::driver::InkwellDriver`] for real
//! browsers and by in-memory doubles in tests.
use anyhow::Result;
use async_trait::async_trait;
use inkwell_config::BrowserConfig;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use super::cookies::BrowserCookie;

/// Launch parameters, resolved from [`BrowserConfig`].
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub executable_path: Option<PathBuf>,
    pub webdriver_url: String,
    pub chromedriver_path: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub window_size: Option<(u32, u32)>,
    pub stealth: bool,
    pub page_load_timeout: Duration,
    pub selector_timeout: Duration,
    pub script_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for LaunchOptions {
    fn from(cfg: &BrowserConfig) -> Self {
        Self {
            headless: cfg.headless,
            executable_path: cfg.executable_path.clone(),
            webdriver_url: cfg.webdriver_url.clone(),
            chromedriver_path: cfg.chromedriver_path.clone(),
            user_data_dir: cfg.user_data_dir.clone(),
            window_size: cfg.window_size,
            stealth: cfg.stealth,
            page_load_timeout: Duration::from_secs(cfg.page_load_timeout_secs),
            selector_timeout: Duration::from_secs(cfg.selector_timeout_secs),
            script_timeout: Duration::from_secs(cfg.script_timeout_secs),
        }
    }
}

/// Script evaluation inside the live page.
///
/// Both calls are remote procedure calls into the page; results come back as JSON.
#[async_trait]
pub trait PageScripting: Send + Sync {
    /// Run `script` as a function body; `args` are visible as `arguments[i]`.
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Apply `function` (JS source of a one-argument function) to the first element
    /// matching `selector`. Yields JSON `null` when nothing matches.
    async fn evaluate_on_selector(&self, selector: &str, function: &str) -> Result<Value>;
}

/// Navigation, waiting and release of one browser + page.
#[async_trait]
pub trait AutomationBackend: PageScripting {
    /// Navigate and block until the load event fires.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Block until an element matching `selector` exists or `timeout` elapses.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Install cookies for the current document's site.
    async fn add_cookies(&self, cookies: &[BrowserCookie]) -> Result<()>;

    async fn close_page(&mut self) -> Result<()>;

    async fn close_browser(&mut self) -> Result<()>;

    /// Stop the automation process, if this backend owns one.
    async fn stop(&mut self) -> Result<()>;
}

/// Produces a ready backend: browser launched, one blank page open.
#[async_trait]
pub trait Launcher: Send + Sync {
    type Backend: AutomationBackend;

    async fn launch(&self, options: &LaunchOptions) -> Result<Self::Backend>;
}
