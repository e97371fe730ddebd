//! Transmission-cadence estimation and dropped-frame detection.
//!
//! Given the sorted arrival timestamps of one CAN identifier, [`estimate`]
//! recovers the nominal transmission period and projects how many frames the
//! observed time span should contain; [`dropped_instants`] walks the gaps and
//! infers where the missing transmissions would have been.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tuning knobs for cadence estimation.
///
/// All three are empirically tuned heuristics, configurable with the defaults
/// the analyzer was calibrated with; none of them carries a stronger
/// guarantee than "best-effort estimate".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceConfig {
    /// Median/mean divergence ratio beyond which the estimator switches from
    /// the median to the binned mode of the intervals.
    pub skew_ratio: f64,
    /// A gap longer than `period * gap_tolerance` is treated as containing
    /// dropped frames.
    pub gap_tolerance: f64,
    /// Bin width in milliseconds used when quantizing intervals for the mode.
    pub mode_bin_ms: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        CadenceConfig {
            skew_ratio: 0.5,
            gap_tolerance: 1.3,
            mode_bin_ms: 1.0,
        }
    }
}

/// Per-identifier transmission statistics derived from arrival timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceStats {
    /// Estimated nominal transmission period in milliseconds.
    pub period_ms: f64,
    /// Frames actually observed.
    pub total_frames: usize,
    /// Frames the estimated period projects over the observed time span.
    pub expected_frames: usize,
    /// Expected minus observed, floored at zero.
    pub dropped_frames: usize,
    /// Percentage of expected frames that went missing.
    pub drop_rate_percent: f64,
    /// Observed time span in seconds.
    pub time_span_seconds: f64,
}

/// Estimates cadence statistics from sorted arrival timestamps.
///
/// Returns `None` for fewer than 3 timestamps (two intervals are the minimum
/// for the divergence check to mean anything) or when every interval is zero.
///
/// The median is robust against a few drop-induced gaps, but once gaps
/// dominate it drifts off the nominal period; a strong median/mean divergence
/// flags that situation and the estimator falls back to the most frequent
/// interval after millisecond quantization.
pub fn estimate(timestamps: &[f64], config: &CadenceConfig) -> Option<CadenceStats> {
    if timestamps.len() < 3 {
        return None;
    }

    let intervals: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    let mut period: f64 = median(&intervals);
    let avg: f64 = intervals.iter().sum::<f64>() / intervals.len() as f64;

    if (period - avg).abs() > config.skew_ratio * period
        && let Some(mode) = binned_mode(&intervals, config.mode_bin_ms)
    {
        period = mode;
    }
    if period <= 0.0 {
        return None;
    }

    let span: f64 = timestamps[timestamps.len() - 1] - timestamps[0];
    // Nudge before flooring so accumulated float error cannot lose a slot.
    let expected: usize = (span / period + 1e-9).floor() as usize + 1;
    let dropped: usize = expected.saturating_sub(timestamps.len());
    let drop_rate: f64 = if expected == 0 {
        0.0
    } else {
        dropped as f64 / expected as f64 * 100.0
    };

    Some(CadenceStats {
        period_ms: period * 1000.0,
        total_frames: timestamps.len(),
        expected_frames: expected,
        dropped_frames: dropped,
        drop_rate_percent: drop_rate,
        time_span_seconds: span,
    })
}

/// Infers the timestamps of dropped frames from anomalous inter-arrival gaps.
///
/// Every gap exceeding `period * gap_tolerance` contributes
/// `floor(gap/period - 0.5)` missing instants at `previous + k * period`,
/// each strictly between the two observed timestamps.
pub fn dropped_instants(timestamps: &[f64], period_s: f64, config: &CadenceConfig) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    if period_s <= 0.0 {
        return out;
    }
    for w in timestamps.windows(2) {
        let gap: f64 = w[1] - w[0];
        if gap > period_s * config.gap_tolerance {
            let missing: i64 = (gap / period_s - 0.5).floor() as i64;
            for k in 1..=missing {
                out.push(w[0] + k as f64 * period_s);
            }
        }
    }
    out
}

fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n: usize = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Most frequent interval after quantization to `bin_ms` bins. Ties resolve
/// to the shorter interval so a run of equal-sized gaps cannot win over the
/// base period.
fn binned_mode(intervals: &[f64], bin_ms: f64) -> Option<f64> {
    if bin_ms <= 0.0 {
        return None;
    }
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &interval in intervals {
        let bin: i64 = (interval * 1000.0 / bin_ms).round() as i64;
        *counts.entry(bin).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(bin_a, count_a), (bin_b, count_b)| {
            count_a.cmp(count_b).then(bin_b.cmp(bin_a))
        })
        .map(|(bin, _)| bin as f64 * bin_ms / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periodic(count: usize, period_s: f64) -> Vec<f64> {
        (0..count).map(|k| k as f64 * period_s).collect()
    }

    #[test]
    fn clean_periodic_stream() {
        let ts: Vec<f64> = periodic(100, 0.010);
        let stats = estimate(&ts, &CadenceConfig::default()).expect("stats missing");
        assert!((stats.period_ms - 10.0).abs() < 1e-9);
        assert_eq!(stats.total_frames, 100);
        assert_eq!(stats.expected_frames, 100);
        assert_eq!(stats.dropped_frames, 0);
        assert_eq!(stats.drop_rate_percent, 0.0);
        assert!((stats.time_span_seconds - 0.99).abs() < 1e-9);
    }

    #[test]
    fn uniformly_dropped_stream_recovers_the_period() {
        // Every 5th frame of a 10 ms stream is missing.
        let ts: Vec<f64> = periodic(100, 0.010)
            .into_iter()
            .enumerate()
            .filter(|(k, _)| k % 5 != 4)
            .map(|(_, t)| t)
            .collect();
        assert_eq!(ts.len(), 80);

        let stats = estimate(&ts, &CadenceConfig::default()).expect("stats missing");
        assert!((stats.period_ms - 10.0).abs() < 0.5);
        // Last surviving timestamp is 980 ms, so 99 slots are projected.
        assert_eq!(stats.expected_frames, 99);
        assert_eq!(stats.dropped_frames, 19);
        assert!((stats.drop_rate_percent - 19.0 / 99.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn heavy_skew_falls_back_to_the_mode() {
        // Gaps of varying size outnumber the base period, so the median lands
        // on a gap length; the mean is dragged even further by blackouts.
        // Only the binned mode still points at the true 10 ms cadence.
        let mut intervals: Vec<f64> = Vec::new();
        intervals.extend(std::iter::repeat_n(0.010, 40));
        intervals.extend(std::iter::repeat_n(0.020, 15));
        intervals.extend(std::iter::repeat_n(0.030, 15));
        intervals.extend(std::iter::repeat_n(0.040, 15));
        intervals.extend(std::iter::repeat_n(2.0, 5));

        let mut ts: Vec<f64> = vec![0.0];
        let mut t: f64 = 0.0;
        for gap in &intervals {
            t += gap;
            ts.push(t);
        }

        assert!((median(&intervals) - 0.020).abs() < 1e-9);
        let stats = estimate(&ts, &CadenceConfig::default()).expect("stats missing");
        assert!((stats.period_ms - 10.0).abs() < 0.5);
        assert!(stats.dropped_frames > stats.total_frames);
    }

    #[test]
    fn fewer_than_three_samples_yield_nothing() {
        assert!(estimate(&[], &CadenceConfig::default()).is_none());
        assert!(estimate(&[0.0], &CadenceConfig::default()).is_none());
        assert!(estimate(&[0.0, 0.010], &CadenceConfig::default()).is_none());
    }

    #[test]
    fn all_zero_intervals_yield_nothing() {
        assert!(estimate(&[1.0, 1.0, 1.0, 1.0], &CadenceConfig::default()).is_none());
    }

    #[test]
    fn single_gap_positions() {
        // 10 ms cadence with 3 frames missing between 20 ms and 60 ms.
        let ts: Vec<f64> = vec![0.0, 0.010, 0.020, 0.060, 0.070, 0.080];
        let drops = dropped_instants(&ts, 0.010, &CadenceConfig::default());
        assert_eq!(drops.len(), 3);
        for (k, d) in drops.iter().enumerate() {
            let expected: f64 = 0.020 + (k as f64 + 1.0) * 0.010;
            assert!((d - expected).abs() < 1e-9);
            assert!(*d > 0.020 && *d < 0.060);
        }
    }

    #[test]
    fn jitter_below_tolerance_is_not_a_drop() {
        let ts: Vec<f64> = vec![0.0, 0.010, 0.022, 0.032, 0.042];
        assert!(dropped_instants(&ts, 0.010, &CadenceConfig::default()).is_empty());
    }

    #[test]
    fn mode_tie_prefers_the_shorter_interval() {
        let intervals: Vec<f64> = vec![0.010, 0.010, 0.020, 0.020];
        let mode = binned_mode(&intervals, 1.0).unwrap();
        assert!((mode - 0.010).abs() < 1e-9);
    }
}
