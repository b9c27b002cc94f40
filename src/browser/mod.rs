//! Browser access for the checkout engine
//!
//! The engine itself only needs three page capabilities, captured by [`PageDriver`]:
//! evaluate a script, read the current URL, and register a script that runs on every
//! subsequent document. [`BrowserSession`] provides them over headless Chrome.

pub mod config;
pub mod driver;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use driver::{PageDriver, decode_script_result};
pub use session::BrowserSession;
