use crate::flow::record::{FlowRecord, FlowSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runs needed before success rate thresholds apply
const MIN_RUNS_FOR_RATE: u32 = 3;
const DEGRADED_BELOW_PCT: f64 = 50.0;
const BROKEN_BELOW_PCT: f64 = 20.0;
/// Failures with no success at all that mark a flow broken
const BROKEN_WITHOUT_SUCCESS: u32 = 3;
/// Consecutive failures that force a re-learn
const RELEARN_STREAK: u32 = 2;

/// Reliability classification of a stored flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Broken,
    NeedsRelearn,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Broken => "broken",
            Self::NeedsRelearn => "needs_relearn",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of a flow, derived from its counters and timestamps only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowHealth {
    pub status: HealthStatus,

    /// Percentage of successful runs, one decimal
    pub success_rate: f64,

    /// Either re-learn signal below is set
    pub needs_relearn: bool,

    /// The most recent failure is newer than the most recent success
    pub failure_after_success: bool,

    /// Consecutive failures reached the re-learn threshold; this one overrides `status`
    pub failure_streak: bool,

    pub consecutive_failures: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub nav_steps: usize,
    pub form_selectors: usize,
    pub payment_selectors: usize,
}

/// Evaluate a stored flow. Pure: reads nothing but the record.
pub fn evaluate(record: &FlowRecord) -> FlowHealth {
    let success_count = record.success_count;
    let failure_count = record.failure_count;
    let total_runs = success_count + failure_count;

    let success_rate = if total_runs > 0 {
        f64::from(success_count) / f64::from(total_runs) * 100.0
    } else {
        0.0
    };

    let mut status = HealthStatus::Healthy;
    if total_runs >= MIN_RUNS_FOR_RATE && success_rate < DEGRADED_BELOW_PCT {
        status = HealthStatus::Degraded;
    }
    if total_runs >= MIN_RUNS_FOR_RATE && success_rate < BROKEN_BELOW_PCT {
        status = HealthStatus::Broken;
    }
    if failure_count >= BROKEN_WITHOUT_SUCCESS && success_count == 0 {
        status = HealthStatus::Broken;
    }

    // ISO-8601 strings compare in time order
    let failure_after_success = match (&record.last_failure, &record.last_success) {
        (Some(failure), Some(success)) => failure > success,
        _ => false,
    };

    let failure_streak = record.consecutive_failures >= RELEARN_STREAK;
    if failure_streak {
        status = HealthStatus::NeedsRelearn;
    }

    FlowHealth {
        status,
        success_rate: (success_rate * 10.0).round() / 10.0,
        needs_relearn: failure_after_success || failure_streak,
        failure_after_success,
        failure_streak,
        consecutive_failures: record.consecutive_failures,
        success_count,
        failure_count,
        nav_steps: record.navigation_steps.len(),
        form_selectors: record.form_selectors.len(),
        payment_selectors: record.payment_selectors.len(),
    }
}

/// Listing entry for a flow together with its health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowOverview {
    #[serde(flatten)]
    pub summary: FlowSummary,
    pub status: HealthStatus,
    pub success_rate: f64,
    pub needs_relearn: bool,
}

impl From<&FlowRecord> for FlowOverview {
    fn from(record: &FlowRecord) -> Self {
        let health = evaluate(record);
        Self {
            summary: FlowSummary::from(record),
            status: health.status,
            success_rate: health.success_rate,
            needs_relearn: health.needs_relearn,
        }
    }
}
