pub mod chromium;
pub mod firefox;

pub use chromium::{ChromeOptions, ChromiumSession};
pub use firefox::{FirefoxOptions, FirefoxSession};
