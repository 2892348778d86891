//! Live page access over the Chrome DevTools Protocol

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions, normalize_url};
pub use session::BrowserSession;
