//! Metrics: dashboard figures derived from the county dataset.
//!
//! DESIGN
//! ======
//! Aggregation is a pure function of `(dataset, settings, county filter,
//! time range)`. Nothing is cached beyond the parsed bundled dataset, so
//! two calls with the same inputs always return equal results.
//!
//! The time range scales query, escalation and intent counts by a fixed
//! multiplier; intent percentages and satisfaction are left alone.
//! `avg_response_time` is a constant, not measured.

pub mod dataset;
pub mod export;

use tracing::debug;

use crate::types::{CountyMetric, DashboardMetrics, IntentMetric, TimeRange};

pub use dataset::DatasetError;

pub const DEFAULT_AVG_RESPONSE_TIME: f64 = 2.3;
pub const DEFAULT_FALLBACK_SATISFACTION: u8 = 84;

/// Baseline (30-day) intent table: `(intent, count, percentage)`.
pub const BASE_INTENTS: [(&str, u64, u8); 5] = [
    ("NHIF Registration", 1234, 28),
    ("KRA PIN Application", 987, 22),
    ("Huduma Appointments", 876, 20),
    ("Tax Returns Filing", 654, 15),
    ("ID Renewal", 543, 12),
];

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    pub week_multiplier: f64,
    pub month_multiplier: f64,
    pub quarter_multiplier: f64,
    pub avg_response_time: f64,
    /// Satisfaction reported when no county matches the filter.
    pub fallback_satisfaction: u8,
    pub base_intents: Vec<IntentMetric>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            week_multiplier: 0.25,
            month_multiplier: 1.0,
            quarter_multiplier: 2.8,
            avg_response_time: DEFAULT_AVG_RESPONSE_TIME,
            fallback_satisfaction: DEFAULT_FALLBACK_SATISFACTION,
            base_intents: BASE_INTENTS
                .iter()
                .map(|&(intent, count, percentage)| IntentMetric { intent: intent.to_owned(), count, percentage })
                .collect(),
        }
    }
}

impl AggregatorSettings {
    #[must_use]
    pub fn multiplier(&self, range: TimeRange) -> f64 {
        match range {
            TimeRange::Week => self.week_multiplier,
            TimeRange::Month => self.month_multiplier,
            TimeRange::Quarter => self.quarter_multiplier,
        }
    }
}

// =============================================================================
// AGGREGATOR
// =============================================================================

pub struct Aggregator<'a> {
    counties: &'a [CountyMetric],
    settings: AggregatorSettings,
}

impl<'a> Aggregator<'a> {
    #[must_use]
    pub fn new(counties: &'a [CountyMetric], settings: AggregatorSettings) -> Self {
        Self { counties, settings }
    }

    #[must_use]
    pub fn counties(&self) -> &[CountyMetric] {
        self.counties
    }

    #[must_use]
    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Compute dashboard figures for an optional county (exact,
    /// case-insensitive) over `range`. An unknown county yields zeroed
    /// totals and the fallback satisfaction.
    #[must_use]
    pub fn aggregate(&self, county: Option<&str>, range: TimeRange) -> DashboardMetrics {
        let selected: Vec<&CountyMetric> = match county {
            Some(name) => self
                .counties
                .iter()
                .filter(|c| c.county_name.to_lowercase() == name.to_lowercase())
                .collect(),
            None => self.counties.iter().collect(),
        };

        let queries: u64 = selected.iter().map(|c| c.queries).sum();
        let escalations: u64 = selected.iter().map(|c| c.escalations).sum();
        let satisfaction_rate = mean_satisfaction(&selected).unwrap_or(self.settings.fallback_satisfaction);

        let multiplier = self.settings.multiplier(range);
        let top_intents = self
            .settings
            .base_intents
            .iter()
            .map(|i| IntentMetric { intent: i.intent.clone(), count: scale(i.count, multiplier), percentage: i.percentage })
            .collect();

        debug!(county = ?county, range = %range, matched = selected.len(), "metrics: aggregated");

        DashboardMetrics {
            total_queries: scale(queries, multiplier),
            satisfaction_rate,
            avg_response_time: self.settings.avg_response_time,
            escalations: scale(escalations, multiplier),
            top_intents,
            county_summary: selected.into_iter().cloned().collect(),
        }
    }
}

/// Aggregate over the bundled dataset with default settings.
#[must_use]
pub fn aggregate(county: Option<&str>, range: TimeRange) -> DashboardMetrics {
    Aggregator::new(dataset::bundled(), AggregatorSettings::default()).aggregate(county, range)
}

// =============================================================================
// ROUNDING
// =============================================================================

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: u64, multiplier: f64) -> u64 {
    (value as f64 * multiplier).round().max(0.0) as u64
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mean_satisfaction(counties: &[&CountyMetric]) -> Option<u8> {
    if counties.is_empty() {
        return None;
    }
    let total: u64 = counties.iter().map(|c| u64::from(c.satisfaction)).sum();
    Some((total as f64 / counties.len() as f64).round() as u8)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
