//! Signal time-series extraction over a parsed trace.
//!
//! [`TraceAnalyzer`] owns the frames of one trace, grouped and stable-sorted
//! per identifier, and memoizes the cadence results, which are pure functions
//! of the immutable frame set. Build a new analyzer whenever the frame set
//! changes; the caches start empty with it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::codec::SignalLayout;
use crate::trace::cadence::{self, CadenceConfig, CadenceStats};
use crate::trace::frame::FrameRecord;

/// Whether a sample was measured from a real frame or reconstructed at an
/// inferred dropped-frame instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleOrigin {
    Measured,
    Interpolated,
}

/// One `(timestamp, value)` sample of a decoded signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Timestamp in seconds.
    pub timestamp: f64,
    /// Physical value.
    pub value: f64,
    /// Sample provenance.
    pub origin: SampleOrigin,
}

/// Decoded time series of one signal on one identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalSeries {
    /// CAN identifier the series was extracted from.
    pub id: u32,
    /// Samples in timestamp order.
    pub points: Vec<SeriesPoint>,
    /// Cadence statistics of the identifier, when enough frames exist.
    pub cadence: Option<CadenceStats>,
}

impl SignalSeries {
    /// Samples that came from real frames.
    pub fn measured(&self) -> impl Iterator<Item = &SeriesPoint> + '_ {
        self.points
            .iter()
            .filter(|p| p.origin == SampleOrigin::Measured)
    }

    /// Samples reconstructed at inferred dropped-frame instants.
    pub fn interpolated(&self) -> impl Iterator<Item = &SeriesPoint> + '_ {
        self.points
            .iter()
            .filter(|p| p.origin == SampleOrigin::Interpolated)
    }
}

/// Cache key for dropped-instant lookups: identifier plus the period
/// quantized to whole microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DropKey {
    id: u32,
    period_us: u64,
}

/// Frame store plus memoized cadence results for one trace.
///
/// All operations are synchronous and single-threaded; every type involved is
/// `Send`, so an interactive host can run an extraction on a background
/// worker and simply discard stale results when a newer request supersedes it.
pub struct TraceAnalyzer {
    frames_by_id: HashMap<u32, Vec<FrameRecord>>,
    config: CadenceConfig,
    stats_cache: HashMap<u32, Option<CadenceStats>>,
    drops_cache: HashMap<DropKey, Vec<f64>>,
}

impl TraceAnalyzer {
    /// Groups `frames` by identifier with the default cadence configuration.
    pub fn new(frames: impl IntoIterator<Item = FrameRecord>) -> Self {
        Self::with_config(frames, CadenceConfig::default())
    }

    /// Groups `frames` by identifier and stable-sorts each substream by
    /// timestamp, so frames with equal timestamps keep their log order.
    pub fn with_config(
        frames: impl IntoIterator<Item = FrameRecord>,
        config: CadenceConfig,
    ) -> Self {
        let mut frames_by_id: HashMap<u32, Vec<FrameRecord>> = HashMap::new();
        for frame in frames {
            frames_by_id.entry(frame.id).or_default().push(frame);
        }
        for substream in frames_by_id.values_mut() {
            substream.sort_by(|a, b| {
                a.timestamp
                    .partial_cmp(&b.timestamp)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        TraceAnalyzer {
            frames_by_id,
            config,
            stats_cache: HashMap::new(),
            drops_cache: HashMap::new(),
        }
    }

    /// Identifiers present in the trace, ascending.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.frames_by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Frames of one identifier, in timestamp order.
    pub fn frames(&self, id: u32) -> &[FrameRecord] {
        self.frames_by_id.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cadence statistics for one identifier, memoized.
    ///
    /// `None` means the substream has fewer than 3 frames.
    pub fn cadence_stats(&mut self, id: u32) -> Option<CadenceStats> {
        if let Some(cached) = self.stats_cache.get(&id) {
            return *cached;
        }
        let timestamps: Vec<f64> = self.timestamps(id);
        let stats: Option<CadenceStats> = cadence::estimate(&timestamps, &self.config);
        self.stats_cache.insert(id, stats);
        stats
    }

    /// Inferred dropped-frame timestamps for one identifier, memoized per
    /// `(identifier, quantized period)`.
    pub fn dropped_instants(&mut self, id: u32) -> Vec<f64> {
        let Some(stats) = self.cadence_stats(id) else {
            return Vec::new();
        };
        let key = DropKey {
            id,
            period_us: (stats.period_ms * 1000.0).round() as u64,
        };
        if let Some(cached) = self.drops_cache.get(&key) {
            return cached.clone();
        }
        let timestamps: Vec<f64> = self.timestamps(id);
        let drops: Vec<f64> =
            cadence::dropped_instants(&timestamps, stats.period_ms / 1000.0, &self.config);
        self.drops_cache.insert(key, drops.clone());
        drops
    }

    /// Decodes one signal over every frame of `id` into a physical time series.
    ///
    /// Frames whose payload cannot contain the signal's bit window are
    /// skipped; a single undecodable frame never aborts the series. With
    /// `interpolate`, inferred dropped-frame instants are filled with values
    /// interpolated from the neighbouring measured samples and flagged as
    /// [`SampleOrigin::Interpolated`].
    pub fn extract_series(
        &mut self,
        id: u32,
        layout: &SignalLayout,
        interpolate: bool,
    ) -> SignalSeries {
        let mut points: Vec<SeriesPoint> = Vec::new();
        if let Some(frames) = self.frames_by_id.get(&id) {
            for frame in frames {
                if let Ok(value) = layout.decode(&frame.payload) {
                    points.push(SeriesPoint {
                        timestamp: frame.timestamp,
                        value,
                        origin: SampleOrigin::Measured,
                    });
                }
            }
        }

        let stats: Option<CadenceStats> = self.cadence_stats(id);

        if interpolate {
            let measured: Vec<SeriesPoint> = points.clone();
            for instant in self.dropped_instants(id) {
                points.push(SeriesPoint {
                    timestamp: instant,
                    value: value_at(&measured, instant),
                    origin: SampleOrigin::Interpolated,
                });
            }
            points.sort_by(|a, b| {
                a.timestamp
                    .partial_cmp(&b.timestamp)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        SignalSeries {
            id,
            points,
            cadence: stats,
        }
    }

    fn timestamps(&self, id: u32) -> Vec<f64> {
        self.frames_by_id
            .get(&id)
            .map(|frames| frames.iter().map(|f| f.timestamp).collect())
            .unwrap_or_default()
    }
}

/// Value of the series at `ts`: linear interpolation between the nearest
/// measured samples, nearest-neighbour when only one side exists, `0.0` when
/// the series is empty. Never extrapolates beyond the observed value range.
fn value_at(points: &[SeriesPoint], ts: f64) -> f64 {
    // First sample at or after ts.
    let idx: usize = points.partition_point(|p| p.timestamp < ts);
    let before: Option<&SeriesPoint> = idx.checked_sub(1).and_then(|i| points.get(i));
    let after: Option<&SeriesPoint> = points.get(idx);
    match (before, after) {
        (Some(a), Some(b)) => {
            let dt: f64 = b.timestamp - a.timestamp;
            if dt <= 0.0 {
                a.value
            } else {
                a.value + (b.value - a.value) * (ts - a.timestamp) / dt
            }
        }
        (Some(a), None) => a.value,
        (None, Some(b)) => b.value,
        (None, None) => 0.0,
    }
}
