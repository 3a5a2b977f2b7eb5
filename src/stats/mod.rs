//! Per-region aggregation over the telemetry table

use crate::{
    defaults::{LATENCY_DECIMALS, LATENCY_PERCENTILE, MISSING_DATA_MESSAGE, UPTIME_DECIMALS},
    error::{AppError, Result},
    models::{RegionStats, StatsQuery, TelemetryTable},
};
use std::sync::Arc;

/// Read-only statistics engine over a loaded telemetry table
#[derive(Debug, Clone)]
pub struct StatsEngine {
    table: Arc<TelemetryTable>,
}

impl StatsEngine {
    /// Create an engine over a shared table
    pub fn new(table: Arc<TelemetryTable>) -> Self {
        Self { table }
    }

    /// Whether the dataset failed to load
    pub fn is_degraded(&self) -> bool {
        self.table.is_empty()
    }

    /// Validate a query and compute statistics for it
    ///
    /// Fails with [`AppError::Validation`] for an empty region list and with
    /// [`AppError::DataUnavailable`] while the table is empty. Regions with
    /// no rows are left out of the result.
    pub fn compute(&self, query: &StatsQuery) -> Result<Vec<RegionStats>> {
        query.validate()?;

        if self.is_degraded() {
            return Err(AppError::data_unavailable(MISSING_DATA_MESSAGE));
        }

        Ok(compute(&self.table, &query.regions, query.threshold_ms))
    }
}

/// Compute statistics for each region in `regions`, keeping the input order
///
/// Regions without rows are skipped; duplicates produce duplicate entries.
pub fn compute<S: AsRef<str>>(table: &TelemetryTable, regions: &[S], threshold_ms: i64) -> Vec<RegionStats> {
    regions
        .iter()
        .filter_map(|region| region_stats(table, region.as_ref(), threshold_ms))
        .collect()
}

/// Statistics for a single region, or `None` when the table has no rows for it
pub fn region_stats(table: &TelemetryTable, region: &str, threshold_ms: i64) -> Option<RegionStats> {
    let mut latencies = Vec::new();
    let mut uptimes = Vec::new();
    for record in table.region(region) {
        latencies.push(record.latency_ms);
        uptimes.push(record.uptime_pct);
    }

    if latencies.is_empty() {
        return None;
    }

    let threshold = threshold_ms as f64;
    let breaches = latencies.iter().filter(|&&latency| latency > threshold).count() as u64;
    let avg_latency = mean(&latencies)?;
    let avg_uptime = mean(&uptimes)?;

    latencies.sort_by(f64::total_cmp);
    let p95_latency = percentile(&latencies, LATENCY_PERCENTILE)?;

    Some(RegionStats {
        region: region.to_string(),
        avg_latency: round_to(avg_latency, LATENCY_DECIMALS),
        p95_latency: round_to(p95_latency, LATENCY_DECIMALS),
        avg_uptime: round_to(avg_uptime, UPTIME_DECIMALS),
        breaches,
    })
}

/// Arithmetic mean over a pairwise sum
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(pairwise_sum(values) / values.len() as f64)
}

const PAIRWISE_BLOCK: usize = 128;
const PAIRWISE_UNROLL: usize = 8;

/// Blocked pairwise summation
///
/// Runs shorter than 8 are summed left to right. Runs up to 128 use eight
/// interleaved accumulators combined as a balanced tree; longer runs are
/// split in two at a multiple of 8. The association order matches numpy's
/// float `sum`.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < PAIRWISE_UNROLL {
        return values.iter().fold(0.0, |acc, &value| acc + value);
    }

    if n <= PAIRWISE_BLOCK {
        let mut acc = [0.0f64; PAIRWISE_UNROLL];
        acc.copy_from_slice(&values[..PAIRWISE_UNROLL]);

        let unrolled = n - n % PAIRWISE_UNROLL;
        for chunk in values[PAIRWISE_UNROLL..unrolled].chunks_exact(PAIRWISE_UNROLL) {
            for (slot, &value) in acc.iter_mut().zip(chunk) {
                *slot += value;
            }
        }

        let head = ((acc[0] + acc[1]) + (acc[2] + acc[3])) + ((acc[4] + acc[5]) + (acc[6] + acc[7]));
        return values[unrolled..].iter().fold(head, |acc, &value| acc + value);
    }

    let mut split = n / 2;
    split -= split % PAIRWISE_UNROLL;
    pairwise_sum(&values[..split]) + pairwise_sum(&values[split..])
}

/// Percentile of sorted values, linearly interpolated between closest ranks
///
/// The rank is `percentile / 100 * (n - 1)`; `percentile` is clamped to
/// `0..=100`.
pub fn percentile(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    if sorted_values.is_empty() {
        return None;
    }

    let percentile = percentile.clamp(0.0, 100.0);
    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        return Some(sorted_values[lower_index]);
    }

    let lower_value = sorted_values[lower_index];
    let upper_value = sorted_values[upper_index];
    let weight = index - lower_index as f64;
    Some(lerp(lower_value, upper_value, weight))
}

/// Interpolate from whichever end is closer to keep the error symmetric
fn lerp(lower: f64, upper: f64, weight: f64) -> f64 {
    let diff = upper - lower;
    if weight >= 0.5 {
        upper - diff * (1.0 - weight)
    } else {
        lower + diff * weight
    }
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / scale
}
