use crate::error::{CheckoutError, Result};
use crate::flow::record::{FlowRecord, FlowSummary, FlowUpdate};
use crate::utils::{normalize_domain, truncate_chars};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest `last_error` message kept on a record
pub(crate) const MAX_ERROR_LEN: usize = 200;

/// Per-domain JSON file store of learned checkout flows.
///
/// Reads fail closed: a missing, unreadable or corrupt file is "no flow". Writes are
/// best effort: a failed write is logged and never reaches the caller, since a save
/// only matters for future runs.
#[derive(Debug, Clone)]
pub struct FlowStore {
    directory: PathBuf,
}

impl FlowStore {
    /// Create a store rooted at `directory` (created lazily on first write)
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File holding a domain's flow
    pub fn flow_path(&self, domain: &str) -> PathBuf {
        let safe_domain = domain.replace(['/', ':'], "_");
        self.directory.join(format!("{}.json", safe_domain))
    }

    /// Load the flow for a domain or URL
    pub fn load(&self, domain_or_url: &str) -> Option<FlowRecord> {
        let domain = normalize_domain(domain_or_url);

        match self.read_record(&domain) {
            Ok(Some(flow)) => {
                log::info!(
                    "Loaded flow for '{}': {} nav steps, {} form selectors, {} payment selectors, {} prior successes",
                    domain,
                    flow.navigation_steps.len(),
                    flow.form_selectors.len(),
                    flow.payment_selectors.len(),
                    flow.success_count
                );
                Some(flow)
            }
            Ok(None) => {
                log::info!("No saved flow for '{}'", domain);
                None
            }
            Err(e) => {
                log::warn!("Failed to load flow for '{}': {}", domain, e);
                None
            }
        }
    }

    /// Record a successful run: merge selectors, replace steps if given, bump counters
    pub fn save(&self, domain_or_url: &str, update: FlowUpdate) {
        let domain = normalize_domain(domain_or_url);

        match self.try_save(&domain, update) {
            Ok(flow) => log::info!(
                "Saved flow for '{}': {} nav steps, {} form selectors, {} payment selectors (visit #{})",
                domain,
                flow.navigation_steps.len(),
                flow.form_selectors.len(),
                flow.payment_selectors.len(),
                flow.success_count
            ),
            Err(e) => log::error!("Failed to save flow for '{}': {}", domain, e),
        }
    }

    /// Record a failed run. Domains without a flow are left alone.
    pub fn record_failure(&self, domain_or_url: &str, error: Option<&str>) {
        let domain = normalize_domain(domain_or_url);

        match self.try_record_failure(&domain, error) {
            Ok(Some(flow)) => log::info!(
                "Recorded failure for '{}' (consecutive: {})",
                domain,
                flow.consecutive_failures
            ),
            Ok(None) => log::debug!("No flow for '{}', failure not recorded", domain),
            Err(e) => log::warn!("Could not record failure for '{}': {}", domain, e),
        }
    }

    /// Remove a domain's flow; true if one existed
    pub fn delete(&self, domain_or_url: &str) -> bool {
        let domain = normalize_domain(domain_or_url);
        let path = self.flow_path(&domain);

        if !path.exists() {
            return false;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted flow for '{}'", domain);
                true
            }
            Err(e) => {
                log::warn!("Failed to delete flow for '{}': {}", domain, e);
                false
            }
        }
    }

    /// Summaries of every readable flow, sorted by domain
    pub fn list(&self) -> Vec<FlowSummary> {
        self.records().iter().map(FlowSummary::from).collect()
    }

    /// Every readable flow, sorted by domain
    pub fn records(&self) -> Vec<FlowRecord> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut flows: Vec<FlowRecord> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| match read_file(&path) {
                Ok(flow) => Some(flow),
                Err(e) => {
                    log::debug!("Skipping unreadable flow {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        flows.sort_by(|a, b| a.domain.cmp(&b.domain));
        flows
    }

    fn read_record(&self, domain: &str) -> Result<Option<FlowRecord>> {
        let path = self.flow_path(domain);
        if !path.exists() {
            return Ok(None);
        }
        read_file(&path).map(Some)
    }

    fn try_save(&self, domain: &str, update: FlowUpdate) -> Result<FlowRecord> {
        // A corrupt existing file is treated like no file
        let existing = self.read_record(domain).ok().flatten();
        let mut flow = existing.unwrap_or_else(|| FlowRecord::new(domain));

        flow.domain = domain.to_string();
        if let Some(platform) = update.platform {
            flow.platform = platform;
        }
        if update.checkout_url_pattern.is_some() {
            flow.checkout_url_pattern = update.checkout_url_pattern;
        }
        if let Some(steps) = update.navigation_steps {
            flow.navigation_steps = steps;
        }
        flow.form_selectors.extend(update.form_selectors);
        flow.payment_selectors.extend(update.payment_selectors);

        flow.success_count += 1;
        flow.consecutive_failures = 0;
        flow.last_success = Some(now_timestamp());
        if update.final_url.is_some() {
            flow.last_url = update.final_url;
        }

        self.write_record(&flow)?;
        Ok(flow)
    }

    fn try_record_failure(&self, domain: &str, error: Option<&str>) -> Result<Option<FlowRecord>> {
        let Some(mut flow) = self.read_record(domain)? else {
            return Ok(None);
        };

        flow.failure_count += 1;
        flow.consecutive_failures += 1;
        flow.last_failure = Some(now_timestamp());
        if let Some(error) = error {
            flow.last_error = Some(truncate_chars(error, MAX_ERROR_LEN));
        }

        self.write_record(&flow)?;
        Ok(Some(flow))
    }

    /// Write through a temp file and rename so readers never see a partial record
    fn write_record(&self, flow: &FlowRecord) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        let json = serde_json::to_string_pretty(flow)?;
        let path = self.flow_path(&flow.domain);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path).map_err(|e| CheckoutError::Storage {
            domain: flow.domain.clone(),
            reason: format!("rename failed: {}", e),
        })?;
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<FlowRecord> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Current UTC time, RFC 3339 with fixed microsecond precision
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
