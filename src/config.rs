use std::env;
use std::path::PathBuf;

/// Env var overriding the flows directory
pub const FLOWS_DIR_ENV: &str = "CHECKOUT_FLOWS_DIR";
/// Env var disabling the popup dismiss script when set to `0` or `false`
pub const DISMISS_POPUPS_ENV: &str = "CHECKOUT_DISMISS_POPUPS";

/// Timer settings of the in-page replay automaton, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTiming {
    /// Delay between element lookups for one step
    pub poll_interval_ms: u64,

    /// Lookups before a step is abandoned
    pub max_attempts: u32,

    /// Pause after a successful click
    pub settle_ms: u64,

    /// Pause after an abandoned step
    pub abandon_ms: u64,

    /// Pause before the first step on a page
    pub initial_delay_ms: u64,
}

impl Default for ReplayTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_attempts: 12,
            settle_ms: 1500,
            abandon_ms: 500,
            initial_delay_ms: 1000,
        }
    }
}

impl ReplayTiming {
    /// Longest time one step may search for its element
    pub fn step_timeout_ms(&self) -> u64 {
        self.poll_interval_ms * u64::from(self.max_attempts)
    }
}

/// Settings for a checkout runner
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Directory holding one `<domain>.json` per learned flow
    pub flows_dir: PathBuf,

    pub replay_timing: ReplayTiming,

    /// Inject the cookie/popup auto-dismiss script before each run
    pub dismiss_popups: bool,

    /// Step cap for agent runs that start behind a replay
    pub replay_max_steps: u32,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            flows_dir: PathBuf::from("./flows"),
            replay_timing: ReplayTiming::default(),
            dismiss_popups: true,
            replay_max_steps: 30,
        }
    }
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `CHECKOUT_FLOWS_DIR` and `CHECKOUT_DISMISS_POPUPS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var(FLOWS_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.flows_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(flag) = env::var(DISMISS_POPUPS_ENV) {
            config.dismiss_popups = parse_flag(&flag, true);
        }

        log::debug!("Checkout config: {:?}", config);
        config
    }

    pub fn flows_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.flows_dir = dir.into();
        self
    }

    pub fn replay_timing(mut self, timing: ReplayTiming) -> Self {
        self.replay_timing = timing;
        self
    }

    pub fn dismiss_popups(mut self, enabled: bool) -> Self {
        self.dismiss_popups = enabled;
        self
    }

    pub fn replay_max_steps(mut self, steps: u32) -> Self {
        self.replay_max_steps = steps;
        self
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => false,
        "1" | "true" | "yes" | "on" => true,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.flows_dir, PathBuf::from("./flows"));
        assert!(config.dismiss_popups);
        assert_eq!(config.replay_max_steps, 30);
        assert_eq!(config.replay_timing.step_timeout_ms(), 6000);
    }

    #[test]
    fn test_builder() {
        let config = CheckoutConfig::new()
            .flows_dir("/tmp/flows")
            .dismiss_popups(false)
            .replay_max_steps(10);

        assert_eq!(config.flows_dir, PathBuf::from("/tmp/flows"));
        assert!(!config.dismiss_popups);
        assert_eq!(config.replay_max_steps, 10);
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("0", true));
        assert!(!parse_flag(" False ", true));
        assert!(parse_flag("1", false));
        assert!(parse_flag("maybe", true));
        assert!(!parse_flag("maybe", false));
    }
}
