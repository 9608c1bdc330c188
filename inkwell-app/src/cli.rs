use clap::{Args, Parser, Subcommand};
use inkwell_common::{InkwellError, Result};
use inkwell_config::{default_config_path, InkwellConfig, InkwellConfigLoader};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "inkwell",
    version,
    about = "Extract the text and embedded fonts of a rendered page"
)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/inkwell/inkwell.yaml when present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save the page text and every embedded font of the content container.
    Extract(ExtractArgs),
    /// Open a visible browser on the persistent profile to sign in; Ctrl+C closes it.
    Login(LoginArgs),
}

/// Browser flags shared by every command.
#[derive(Debug, Args)]
pub struct BrowserArgs {
    /// Browser binary to launch.
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Persistent browser profile directory.
    #[arg(long, value_name = "DIR")]
    pub app_dir: Option<PathBuf>,

    /// Run without a visible window.
    #[arg(long)]
    pub headless: bool,

    /// WebDriver endpoint to connect to.
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// Spawn this chromedriver binary for the session.
    #[arg(long, value_name = "PATH")]
    pub chromedriver: Option<PathBuf>,
}

impl BrowserArgs {
    pub fn apply(&self, cfg: &mut InkwellConfig) {
        if let Some(path) = &self.chrome_path {
            cfg.browser.executable_path = Some(path.clone());
        }
        if let Some(dir) = &self.app_dir {
            cfg.browser.user_data_dir = Some(dir.clone());
        }
        if self.headless {
            cfg.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            cfg.browser.webdriver_url = url.clone();
        }
        if let Some(path) = &self.chromedriver {
            cfg.browser.chromedriver_path = Some(path.clone());
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Page to extract.
    pub url: Url,

    /// Where the extracted text is written.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory receiving font_<i>.<ext> files.
    #[arg(long, value_name = "DIR")]
    pub font_dir: Option<PathBuf>,

    /// Cookie export (JSON) installed before reading the page.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

impl ExtractArgs {
    pub fn apply(&self, cfg: &mut InkwellConfig) {
        self.browser.apply(cfg);
        if let Some(path) = &self.output {
            cfg.output.text_file = path.clone();
        }
        if let Some(dir) = &self.font_dir {
            cfg.output.font_dir = dir.clone();
        }
        if let Some(path) = &self.cookies {
            cfg.output.cookies_file = Some(path.clone());
        }
    }
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Page to open, typically the site's sign-in page.
    pub url: Url,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// An explicit file must exist; the default location is merged only when present.
pub fn load_config(explicit: Option<&Path>) -> Result<InkwellConfig> {
    let loader = InkwellConfigLoader::new();
    let loader = match (explicit, default_config_path()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(default)) => loader.with_optional_file(default),
        (None, None) => loader,
    };
    loader
        .load()
        .map_err(|e| InkwellError::Config(e.to_string()))
}
