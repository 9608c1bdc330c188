use crate::inkwell_browser::{
    capability::{AutomationBackend, LaunchOptions, Launcher, PageScripting},
    cookies::BrowserCookie,
    stealth::{build_launch_arguments, StealthScripts},
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use url::Url;
use webdriver::capabilities::Capabilities;

const CONNECT_ATTEMPTS_WITH_SPAWNED_DRIVER: u32 = 20;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Launches Chrome through a WebDriver endpoint, spawning chromedriver when configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FantocciniLauncher;

#[async_trait]
impl Launcher for FantocciniLauncher {
    type Backend = InkwellDriver;

    async fn launch(&self, options: &LaunchOptions) -> Result<InkwellDriver> {
        InkwellDriver::new(options).await
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client and, optionally, the
/// chromedriver process it talks to.
pub struct InkwellDriver {
    pub client: Client,
    chromedriver: Option<Child>,
    stealth: bool,
    page_load_timeout: Duration,
    script_timeout: Duration,
}

impl InkwellDriver {
    /// Start a browser session.
    ///
    /// Connects to `options.webdriver_url` (Chromedriver's `http://localhost:9515` by
    /// default). When `options.chromedriver_path` is set, that binary is spawned first
    /// on the URL's port and owned by the driver until [`AutomationBackend::stop`].
    pub async fn new(options: &LaunchOptions) -> Result<Self> {
        let caps = build_capabilities(options);

        let mut chromedriver = match &options.chromedriver_path {
            Some(path) => Some(spawn_chromedriver(path, &options.webdriver_url)?),
            None => None,
        };

        let attempts = if chromedriver.is_some() {
            CONNECT_ATTEMPTS_WITH_SPAWNED_DRIVER
        } else {
            1
        };

        let client = match connect(caps, &options.webdriver_url, attempts).await {
            Ok(client) => client,
            Err(err) => {
                if let Some(child) = chromedriver.as_mut() {
                    let _ = child.kill().await;
                }
                return Err(err);
            }
        };

        info!(
            target: "driver",
            webdriver = %options.webdriver_url,
            headless = options.headless,
            spawned = chromedriver.is_some(),
            "browser session started"
        );

        Ok(Self {
            client,
            chromedriver,
            stealth: options.stealth,
            page_load_timeout: options.page_load_timeout,
            script_timeout: options.script_timeout,
        })
    }
}

fn build_capabilities(options: &LaunchOptions) -> Capabilities {
    let mut caps = Capabilities::new();
    let mut chrome_opts = Map::new();

    chrome_opts.insert("args".to_string(), json!(build_launch_arguments(options)));
    chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));
    if let Some(binary) = &options.executable_path {
        chrome_opts.insert("binary".to_string(), json!(binary.display().to_string()));
    }

    caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome_opts));
    // `normal` makes navigation return once the load event has fired.
    caps.insert("pageLoadStrategy".to_string(), json!("normal"));
    caps
}

fn spawn_chromedriver(path: &Path, webdriver_url: &str) -> Result<Child> {
    let url = Url::parse(webdriver_url)
        .with_context(|| format!("invalid webdriver url: {webdriver_url}"))?;
    let port = url.port_or_known_default().unwrap_or(9515);

    let child = Command::new(path)
        .arg(format!("--port={port}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn chromedriver at {}", path.display()))?;

    debug!(target: "driver", path = %path.display(), port, "spawned chromedriver");
    Ok(child)
}

async fn connect(caps: Capabilities, webdriver_url: &str, attempts: u32) -> Result<Client> {
    let mut attempt = 1;
    loop {
        match ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(webdriver_url)
            .await
        {
            Ok(client) => return Ok(client),
            Err(err) if attempt < attempts => {
                debug!(target: "driver", attempt, error = %err, "webdriver not ready yet");
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(anyhow::Error::from(err)
                    .context(format!("failed to connect to webdriver at {webdriver_url}")))
            }
        }
    }
}

/// Wrap a one-argument JS function so it runs against `document.querySelector(arguments[0])`.
pub fn selector_script(function: &str) -> String {
    format!(
        "const el = document.querySelector(arguments[0]);\n\
         if (!el) return null;\n\
         return ({function})(el);"
    )
}

#[async_trait]
impl PageScripting for InkwellDriver {
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        tokio::time::timeout(self.script_timeout, self.client.execute(script, args))
            .await
            .map_err(|_| anyhow!("script did not complete within {:?}", self.script_timeout))?
            .map_err(anyhow::Error::from)
    }

    async fn evaluate_on_selector(&self, selector: &str, function: &str) -> Result<Value> {
        self.evaluate(&selector_script(function), vec![json!(selector)])
            .await
    }
}

#[async_trait]
impl AutomationBackend for InkwellDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        tokio::time::timeout(self.page_load_timeout, self.client.goto(url))
            .await
            .map_err(|_| anyhow!("page did not load within {:?}", self.page_load_timeout))??;

        if self.stealth {
            if let Err(err) = self
                .client
                .execute(StealthScripts::get_core_evasions(), vec![])
                .await
            {
                warn!(target: "driver", error = %err, "failed to apply evasions");
            }
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .with_context(|| format!("`{selector}` did not appear within {timeout:?}"))?;
        Ok(())
    }

    async fn add_cookies(&self, cookies: &[BrowserCookie]) -> Result<()> {
        for cookie in cookies {
            if let Err(err) = self.client.add_cookie(cookie.to_webdriver()).await {
                warn!(target: "driver", name = %cookie.name, error = %err, "cookie rejected");
            }
        }
        Ok(())
    }

    async fn close_page(&mut self) -> Result<()> {
        self.client.close_window().await?;
        Ok(())
    }

    async fn close_browser(&mut self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.chromedriver.take() {
            child
                .kill()
                .await
                .context("failed to stop chromedriver")?;
        }
        Ok(())
    }
}
