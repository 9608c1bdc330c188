use inkwell_config::{FontFamilySource, InkwellConfigLoader, UnrecognizedSourcePolicy};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
browser:
  headless: true
  executable_path: "${INKWELL_TEST_CHROME}"
  window_size: [1280, 800]
  selector_timeout_secs: 5
extraction:
  font_family_source: computed
output:
  text_file: "chapter.txt"
  font_dir: "fonts"
  "#;
    let p = write_yaml(&tmp, "inkwell.yaml", file_yaml);

    let config = temp_env::with_var("INKWELL_TEST_CHROME", Some("/opt/chromium/chrome"), || {
        InkwellConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert!(config.browser.headless);
    assert_eq!(
        config.browser.executable_path,
        Some(PathBuf::from("/opt/chromium/chrome"))
    );
    assert_eq!(config.browser.window_size, Some((1280, 800)));
    assert_eq!(config.browser.selector_timeout_secs, 5);
    assert_eq!(config.browser.page_load_timeout_secs, 60);
    assert_eq!(
        config.extraction.font_family_source,
        FontFamilySource::Computed
    );
    assert_eq!(config.extraction.container_selector, "#manuscript");
    assert_eq!(config.output.text_file, PathBuf::from("chapter.txt"));
    assert_eq!(config.output.font_dir, PathBuf::from("fonts"));
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "inkwell.yaml",
        "browser:\n  headless: false\nextraction:\n  on_unrecognized_source: stop\n",
    );

    let config = temp_env::with_vars(
        [
            ("INKWELL__BROWSER__HEADLESS", Some("true")),
            ("INKWELL__EXTRACTION__ON_UNRECOGNIZED_SOURCE", Some("skip")),
        ],
        || InkwellConfigLoader::new().with_file(&p).load().unwrap(),
    );

    assert!(config.browser.headless);
    assert_eq!(
        config.extraction.on_unrecognized_source,
        UnrecognizedSourcePolicy::Skip
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = InkwellConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("optional file may be absent");

    assert_eq!(config.output.text_file, PathBuf::from("output.txt"));
    assert!(config.output.cookies_file.is_none());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = InkwellConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();

    assert!(result.is_err());
}
