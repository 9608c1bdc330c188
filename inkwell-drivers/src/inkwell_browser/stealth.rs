use super::capability::LaunchOptions;

/// Construct Chrome command‑line arguments for the given launch options.
pub fn build_launch_arguments(options: &LaunchOptions) -> Vec<String> {
    let mut args = vec![
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];
    if options.stealth {
        args.push("--disable-blink-features=AutomationControlled".to_string());
        args.push("--disable-extensions".to_string());
    }
    if options.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    match options.window_size {
        Some((width, height)) => args.push(format!("--window-size={width},{height}")),
        None if !options.headless => args.push("--start-maximized".to_string()),
        None => {}
    }
    if let Some(dir) = &options.user_data_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
    }
    args
}

/// JavaScript evasions applied after navigation to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    pub fn get_core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }
}
