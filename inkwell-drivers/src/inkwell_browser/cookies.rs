//! Import of cookie exports (puppeteer / DevTools JSON) so that pages behind a
//! sign-in render the same content they do in the user's own browser.
use fantoccini::cookies::Cookie;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// One cookie as found in a puppeteer-style JSON export. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl BrowserCookie {
    /// Convert into the WebDriver cookie representation.
    pub fn to_webdriver(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), self.value.clone());
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie.set_path(self.path.clone().unwrap_or_else(|| "/".to_string()));
        cookie.set_secure(self.secure);
        cookie.set_http_only(self.http_only);
        cookie
    }
}

/// Parse a JSON array of cookies.
pub fn parse_cookies(raw: &str) -> serde_json::Result<Vec<BrowserCookie>> {
    serde_json::from_str(raw)
}

/// Read cookies from `path`.
///
/// A missing or malformed file is not fatal: the page is simply loaded without them.
pub async fn load_cookies(path: &Path) -> Vec<BrowserCookie> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(target: "driver", path = %path.display(), error = %err, "cookie file not readable");
            return Vec::new();
        }
    };

    match parse_cookies(&raw) {
        Ok(cookies) => {
            info!(target: "driver", path = %path.display(), count = cookies.len(), "loaded cookies");
            cookies
        }
        Err(err) => {
            warn!(target: "driver", path = %path.display(), error = %err, "only JSON cookie exports are supported");
            Vec::new()
        }
    }
}
