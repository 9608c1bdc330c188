//! Runs the in-page scripts in a real browser.
//!
//! Needs a WebDriver endpoint, e.g. `chromedriver --port=9515` and
//! `INKWELL_WEBDRIVER_URL=http://localhost:9515 cargo test -- --ignored`.
use base64::Engine;
use inkwell_config::{BrowserConfig, ExtractionConfig, FontFamilySource};
use inkwell_drivers::{FantocciniLauncher, LaunchOptions};
use inkwell_extract::Extractor;
use tokio_util::sync::CancellationToken;

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<style>
@font-face { font-family: "secret-font"; src: url("data:font/woff2;charset=utf-8;base64,AAEC") format("woff2"); }
@font-face { font-family: other-font; src: url("data:font/ttf;charset=utf-8;base64,AAAA"); }
@font-face { font-family: 'secret-font'; src: url("data:font/ttf;charset=utf-8;base64,AwQF"); }
.styled { font-family: secret-font, serif; }
</style>
</head>
<body>
<div id="manuscript" __STYLE__>
  <h1>  Chapter 1  </h1>
  <p>First</p>
  <p></p>
  <span>not a text element</span>
  <p>Last</p>
</div>
</body>
</html>"#;

fn page_url(container_style: &str) -> String {
    let html = PAGE.replace("__STYLE__", container_style);
    format!(
        "data:text/html;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(html)
    )
}

fn options_or_skip() -> Option<LaunchOptions> {
    let Ok(webdriver_url) = std::env::var("INKWELL_WEBDRIVER_URL") else {
        eprintln!("skipping: INKWELL_WEBDRIVER_URL not set");
        return None;
    };
    Some(LaunchOptions::from(&BrowserConfig {
        headless: true,
        webdriver_url,
        ..BrowserConfig::default()
    }))
}

#[tokio::test]
#[ignore]
async fn inline_family_text_and_fonts_from_a_real_page() {
    let Some(options) = options_or_skip() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(FantocciniLauncher, options, &ExtractionConfig::default());

    let outcome = extractor
        .run(
            &page_url(r#"style="font-family: secret-font, serif""#),
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.content.text, "Chapter 1\nFirst\n\nLast");
    let batch = outcome.fonts.unwrap();
    assert_eq!(batch.key.as_str(), "secret-font");
    assert_eq!(batch.assets.len(), 2);
    assert_eq!(std::fs::read(dir.path().join("font_0.woff2")).unwrap(), vec![0, 1, 2]);
    assert_eq!(std::fs::read(dir.path().join("font_1.ttf")).unwrap(), vec![3, 4, 5]);
}

#[tokio::test]
#[ignore]
async fn computed_family_follows_the_cascade() {
    let Some(options) = options_or_skip() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let inline_only = Extractor::new(
        FantocciniLauncher,
        options.clone(),
        &ExtractionConfig::default(),
    );
    let computed = Extractor::new(
        FantocciniLauncher,
        options,
        &ExtractionConfig {
            font_family_source: FontFamilySource::Computed,
            ..ExtractionConfig::default()
        },
    );
    let url = page_url(r#"class="styled""#);

    let outcome = inline_only
        .run(&url, dir.path(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.content.font_family, "");
    assert!(outcome.fonts.is_err());

    let outcome = computed
        .run(&url, dir.path(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.fonts.unwrap().assets.len(), 2);
}
