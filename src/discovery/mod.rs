//! Selector discovery after a successful checkout
//!
//! The selectors the fill engine actually used are authoritative. A scan of the final
//! page adds selectors for fields the tools never touched, classified against a fixed
//! field taxonomy.

pub mod liveness;
pub mod platform;
pub mod scan;
pub mod taxonomy;

pub use liveness::{SelectorLiveness, check_selectors};
pub use platform::{checkout_url_pattern, detect_platform};
pub use scan::{LearnedSelectors, reconcile, scan_page};
pub use taxonomy::{PAYMENT_FIELDS, classify_field, is_payment_field};

use crate::browser::PageDriver;

/// Merge tool-reported selectors with a scan of the current page.
/// A failed scan leaves the reported selectors as they are.
pub fn discover(driver: &dyn PageDriver, reported: &LearnedSelectors) -> LearnedSelectors {
    log::info!("Discovering selectors ({} reported by tools)", reported.len());

    match scan_page(driver) {
        Ok(scanned) => reconcile(reported, &scanned),
        Err(e) => {
            log::warn!("Page scan failed: {}", e);
            reported.clone()
        }
    }
}
