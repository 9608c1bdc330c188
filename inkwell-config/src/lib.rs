//! Loader for Inkwell configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field is optional),
//! 2. a YAML/TOML/JSON file (see [`default_config_path`]),
//! 3. inline YAML snippets (tests, CLI),
//! 4. `INKWELL__SECTION__FIELD` environment variables.
//!
//! String values may reference `${VAR}` placeholders; they are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use inkwell_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InkwellConfig {
    pub browser: BrowserConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// How the browser is launched and how long each suspension point may block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Locally installed browser binary; `CHROME_PATH` or a platform default when unset.
    pub executable_path: Option<PathBuf>,
    pub webdriver_url: String,
    /// When set, this chromedriver binary is spawned for the session and stopped afterwards.
    pub chromedriver_path: Option<PathBuf>,
    /// Persistent browser profile, e.g. one that holds a signed-in session.
    pub user_data_dir: Option<PathBuf>,
    pub window_size: Option<(u32, u32)>,
    pub stealth: bool,
    pub page_load_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub script_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            executable_path: default_executable_path(),
            webdriver_url: "http://localhost:9515".to_string(),
            chromedriver_path: None,
            user_data_dir: None,
            window_size: None,
            stealth: true,
            page_load_timeout_secs: 60,
            selector_timeout_secs: 30,
            script_timeout_secs: 30,
        }
    }
}

/// Where the content lives and how font sources are treated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub container_selector: String,
    pub text_selector: String,
    pub font_family_source: FontFamilySource,
    pub on_unrecognized_source: UnrecognizedSourcePolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            container_selector: "#manuscript".to_string(),
            text_selector: "h1, h2, h3, h4, h5, h6, p".to_string(),
            font_family_source: FontFamilySource::default(),
            on_unrecognized_source: UnrecognizedSourcePolicy::default(),
        }
    }
}

/// Which `font-family` value of the container is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamilySource {
    /// The container's inline `style` attribute.
    #[default]
    Inline,
    /// The cascaded value from `getComputedStyle`.
    Computed,
}

/// What happens when a matched `src` is not an embedded data URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedSourcePolicy {
    /// Abort the batch at the first unrecognized source.
    #[default]
    Stop,
    /// Log a warning and continue with the next source.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub text_file: PathBuf,
    pub font_dir: PathBuf,
    /// Puppeteer-style cookie export applied before the content is read.
    pub cookies_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            text_file: PathBuf::from("output.txt"),
            font_dir: PathBuf::from("."),
            cookies_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            dir: None,
            filter: "info".to_string(),
        }
    }
}

/// `CHROME_PATH`, else the usual install location on macOS and Windows.
pub fn default_executable_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME_PATH") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if cfg!(target_os = "macos") {
        Some(PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ))
    } else if cfg!(target_os = "windows") {
        Some(PathBuf::from(
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        ))
    } else {
        None
    }
}

/// `<config dir>/inkwell/inkwell.yaml`, e.g. `~/.config/inkwell/inkwell.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("inkwell").join("inkwell.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct InkwellConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for InkwellConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl InkwellConfigLoader {
    /// Start with defaults plus `INKWELL__` environment overrides.
    ///
    /// ```
    /// use inkwell_config::InkwellConfigLoader;
    ///
    /// let config = InkwellConfigLoader::new()
    ///     .with_yaml_str("extraction:\n  container_selector: '#article'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.extraction.container_selector, "#article");
    /// assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when it exists.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use inkwell_config::{InkwellConfigLoader, UnrecognizedSourcePolicy};
    ///
    /// let cfg = InkwellConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// extraction:
    ///   on_unrecognized_source: skip
    /// output:
    ///   font_dir: fonts
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.extraction.on_unrecognized_source, UnrecognizedSourcePolicy::Skip);
    /// assert_eq!(cfg.output.font_dir.to_str(), Some("fonts"));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment variables use the `INKWELL` prefix and `__` as the section separator,
    /// e.g. `INKWELL__BROWSER__HEADLESS=true`.
    pub fn load(self) -> Result<InkwellConfig, ConfigError> {
        // Environment goes last so it overrides every file.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("INKWELL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: InkwellConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
