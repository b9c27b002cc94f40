use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            browser::driver::{PageDriver, invocation},
            error::{CheckoutError, Result}};
use headless_chrome::{Browser, Tab, protocol::cdp::Page};
use serde_json::Value;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Checkout pages are aggressive about bot detection
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A learning pass can take minutes; the default idle timeout is 30 seconds
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| CheckoutError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| CheckoutError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect(options.ws_url).map_err(|e| CheckoutError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| CheckoutError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: visible and focused
        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        // Second pass: visible only
        for tab in &tabs {
            if let Ok(remote_object) = tab.evaluate("document.visibilityState === 'visible'", false) {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
        }

        // Headless tabs often report hidden; fall back to the first one
        tabs.into_iter()
            .next()
            .ok_or_else(|| CheckoutError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| CheckoutError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            let _ = tab.close(false);
        }
        Ok(())
    }
}

impl PageDriver for BrowserSession {
    fn evaluate(&self, script: &str, args: Option<&Value>) -> Result<Value> {
        let expression = invocation(script, args);
        let result = self
            .tab()?
            .evaluate(&expression, true)
            .map_err(|e| CheckoutError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    fn add_init_script(&self, script: &str) -> Result<()> {
        self.tab()?
            .call_method(Page::AddScriptToEvaluateOnNewDocument {
                source: script.to_string(),
                world_name: None,
                include_command_line_api: None,
                run_immediately: None,
            })
            .map_err(|e| CheckoutError::EvaluationFailed(format!("Failed to add init script: {}", e)))?;

        Ok(())
    }
}
