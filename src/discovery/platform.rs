use crate::browser::{PageDriver, decode_script_result};
use crate::flow::Platform;
use crate::utils::url_path;

pub const DETECT_PLATFORM_SCRIPT: &str = include_str!("detect_platform.js");

/// Path markers of checkout pages, most specific first
const CHECKOUT_PATH_MARKERS: [&str; 4] = ["/checkouts/", "/checkout/", "/cart/checkout", "/order/"];

/// Best-effort platform of the current page; `Unknown` when detection fails
pub fn detect_platform(driver: &dyn PageDriver) -> Platform {
    let tag = driver
        .evaluate(DETECT_PLATFORM_SCRIPT, None)
        .and_then(decode_script_result::<String>);

    match tag {
        Ok(tag) => {
            let platform = Platform::from_tag(&tag);
            log::info!("Platform: {}", platform);
            platform
        }
        Err(e) => {
            log::warn!("Platform detection failed: {}", e);
            Platform::Unknown
        }
    }
}

/// Checkout path marker contained in the path of `url`
pub fn checkout_url_pattern(url: &str) -> Option<&'static str> {
    let path = url_path(url);
    CHECKOUT_PATH_MARKERS.into_iter().find(|marker| path.contains(marker))
}
