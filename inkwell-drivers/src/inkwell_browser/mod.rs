pub mod capability;
pub mod cookies;
pub mod driver;
pub mod session;
pub mod stealth;
