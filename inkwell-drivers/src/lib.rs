//! Driver layer for browser automation.
//!
//! This crate exposes the capability interface the extraction pipeline is
//! written against, its WebDriver implementation, and the session manager
//! that guarantees the browser is released on every exit path.
//!
//! - [`inkwell_browser::capability`]: `Launcher`, `AutomationBackend`, `PageScripting`
//! - [`inkwell_browser::driver::InkwellDriver`]: `fantoccini` client wrapper
//! - [`inkwell_browser::session::PageSession`]: scoped browser + page ownership
//! - [`inkwell_browser::stealth`]: launch arguments and JS evasions
//! - [`inkwell_browser::cookies`]: cookie export import
pub mod inkwell_browser;

pub use inkwell_browser::capability::{AutomationBackend, LaunchOptions, Launcher, PageScripting};
pub use inkwell_browser::cookies::BrowserCookie;
pub use inkwell_browser::driver::{FantocciniLauncher, InkwellDriver};
pub use inkwell_browser::session::PageSession;
