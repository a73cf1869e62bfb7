//! Frame timing and sample buffers consumed by performance overlays.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of samples retained by [`Stopwatch`] and [`CounterValues`].
pub const MAX_SAMPLES: usize = 120;

/// Source of the current frame budget (one refresh interval).
pub trait RefreshRateUpdater: Send + Sync {
    /// Time available to produce one frame.
    fn frame_budget(&self) -> Duration;
}

/// Refresh-rate updater for a display with a fixed rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedRefreshRateUpdater {
    budget: Duration,
}

impl FixedRefreshRateUpdater {
    /// Build an updater for `fps` frames per second. Non-positive rates fall back to 60Hz.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            60.0
        };
        Self {
            budget: Duration::from_secs_f64(1.0 / fps),
        }
    }
}

impl Default for FixedRefreshRateUpdater {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl RefreshRateUpdater for FixedRefreshRateUpdater {
    fn frame_budget(&self) -> Duration {
        self.budget
    }
}

/// Fixed-capacity ring buffer of lap durations.
///
/// `stop` and `set_lap_time` both advance the current sample; once more than
/// [`MAX_SAMPLES`] laps are recorded the oldest one is overwritten.
pub struct Stopwatch {
    laps: Vec<Duration>,
    current_sample: usize,
    start: Option<Instant>,
    refresh_rate_updater: Arc<dyn RefreshRateUpdater>,
}

impl std::fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwatch")
            .field("current_sample", &self.current_sample)
            .field("frame_budget", &self.frame_budget())
            .finish_non_exhaustive()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new(Arc::new(FixedRefreshRateUpdater::default()))
    }
}

impl Stopwatch {
    /// Create a stopwatch whose budget comes from `refresh_rate_updater`.
    pub fn new(refresh_rate_updater: Arc<dyn RefreshRateUpdater>) -> Self {
        Self {
            laps: vec![Duration::ZERO; MAX_SAMPLES],
            current_sample: MAX_SAMPLES - 1,
            start: None,
            refresh_rate_updater,
        }
    }

    /// Start timing a lap.
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Stop timing and record the lap. A stop without a start is ignored.
    pub fn stop(&mut self) {
        if let Some(start) = self.start.take() {
            self.set_lap_time(start.elapsed());
        }
    }

    /// Record an externally measured lap.
    pub fn set_lap_time(&mut self, delta: Duration) {
        self.current_sample = (self.current_sample + 1) % self.laps.len();
        self.laps[self.current_sample] = delta;
    }

    /// Most recently recorded lap.
    pub fn last_lap(&self) -> Duration {
        self.laps[self.current_sample]
    }

    /// Largest lap in the buffer.
    pub fn max_delta(&self) -> Duration {
        self.laps.iter().copied().max().unwrap_or_default()
    }

    /// Mean of all laps in the buffer (unrecorded slots count as zero).
    pub fn average_delta(&self) -> Duration {
        let sum: Duration = self.laps.iter().sum();
        sum / self.laps.len() as u32
    }

    /// Lap at buffer index `index`, if in range.
    pub fn lap(&self, index: usize) -> Option<Duration> {
        self.laps.get(index).copied()
    }

    /// Capacity of the lap buffer.
    pub fn laps_count(&self) -> usize {
        self.laps.len()
    }

    /// Buffer index of the most recently recorded lap.
    pub fn current_sample(&self) -> usize {
        self.current_sample
    }

    /// Current frame budget.
    pub fn frame_budget(&self) -> Duration {
        self.refresh_rate_updater.frame_budget()
    }

    /// Express `frame_time` as a fraction of the frame budget.
    pub fn unit_frame_interval(&self, frame_time: Duration) -> f64 {
        let budget = self.frame_budget().as_secs_f64();
        if budget <= 0.0 {
            return 0.0;
        }
        frame_time.as_secs_f64() / budget
    }

    /// Count of laps in the buffer that exceeded the frame budget.
    pub fn janky_laps(&self) -> usize {
        let budget = self.frame_budget();
        self.laps.iter().filter(|&&lap| lap > budget).count()
    }
}

/// Monotonic event counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counter {
    count: u64,
}

impl Counter {
    /// Current count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Add `n` to the count.
    pub fn increment(&mut self, n: u64) {
        self.count = self.count.saturating_add(n);
    }

    /// Reset the count to `value`.
    pub fn reset(&mut self, value: u64) {
        self.count = value;
    }
}

/// Ring buffer of sampled integer values (e.g. bytes held by the raster cache per frame).
#[derive(Debug, Clone)]
pub struct CounterValues {
    values: Vec<i64>,
    current_sample: usize,
}

impl Default for CounterValues {
    fn default() -> Self {
        Self {
            values: vec![0; MAX_SAMPLES],
            current_sample: MAX_SAMPLES - 1,
        }
    }
}

impl CounterValues {
    /// Record a sample, overwriting the oldest once the buffer is full.
    pub fn add(&mut self, value: i64) {
        self.current_sample = (self.current_sample + 1) % self.values.len();
        self.values[self.current_sample] = value;
    }

    /// Most recent sample.
    pub fn last(&self) -> i64 {
        self.values[self.current_sample]
    }

    /// Largest sample in the buffer.
    pub fn max_value(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or_default()
    }

    /// Smallest sample in the buffer.
    pub fn min_value(&self) -> i64 {
        self.values.iter().copied().min().unwrap_or_default()
    }

    /// Buffer capacity.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; the buffer is pre-filled.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Buffer index of the most recent sample.
    pub fn current_sample(&self) -> usize {
        self.current_sample
    }
}

#[cfg(test)]
#[path = "../tests/unit/instrumentation.rs"]
mod tests;
