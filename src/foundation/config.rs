use crate::foundation::error::{FramepipeError, FramepipeResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default number of consecutive frames a subtree must be seen before it is worth caching.
pub const DEFAULT_ACCESS_THRESHOLD: u32 = 3;
/// Default number of new raster cache entries allowed per frame.
pub const DEFAULT_PICTURE_AND_DISPLAY_LIST_CACHE_LIMIT_PER_FRAME: usize = 3;
/// Default number of unaccessed sweeps after which a cache entry is evicted.
pub const DEFAULT_MAX_SURFACE_AGE: u32 = 3;
/// Default display-list op count above which content counts as complex.
pub const DEFAULT_COMPLEXITY_THRESHOLD: usize = 5;
/// Default fixed-point factor for scale-bucket quantization.
pub const DEFAULT_SCALE_QUANTIZATION: f64 = 1000.0;
/// Default pipeline depth (frames in flight between UI and raster threads).
pub const DEFAULT_PIPELINE_DEPTH: usize = 2;
/// Default display refresh rate.
pub const DEFAULT_REFRESH_RATE_HZ: f64 = 60.0;

/// Raster cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterCacheOpts {
    /// Consecutive frames a layer must be seen before it asks the cache to rasterize it.
    pub access_threshold: u32,
    /// Maximum number of entries rasterized within a single frame.
    pub picture_and_display_list_cache_limit_per_frame: usize,
    /// Number of unaccessed sweeps after which an entry is evicted.
    pub max_surface_age: u32,
    /// Op count above which a display list is considered worth caching.
    pub complexity_threshold: usize,
    /// Fixed-point factor used to bucket matrix scale/skew coefficients in cache keys.
    pub scale_quantization: f64,
}

impl Default for RasterCacheOpts {
    fn default() -> Self {
        Self {
            access_threshold: DEFAULT_ACCESS_THRESHOLD,
            picture_and_display_list_cache_limit_per_frame:
                DEFAULT_PICTURE_AND_DISPLAY_LIST_CACHE_LIMIT_PER_FRAME,
            max_surface_age: DEFAULT_MAX_SURFACE_AGE,
            complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
            scale_quantization: DEFAULT_SCALE_QUANTIZATION,
        }
    }
}

impl RasterCacheOpts {
    /// Check value ranges.
    pub fn validate(&self) -> FramepipeResult<()> {
        if self.max_surface_age == 0 {
            return Err(FramepipeError::validation(
                "raster_cache.max_surface_age must be >= 1",
            ));
        }
        if !self.scale_quantization.is_finite() || self.scale_quantization <= 0.0 {
            return Err(FramepipeError::validation(
                "raster_cache.scale_quantization must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Top-level compositor configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FramepipeOpts {
    /// Maximum number of frames in flight between the UI and raster threads.
    pub pipeline_depth: usize,
    /// Enable frame timing and cache memory sampling.
    pub instrumentation: bool,
    /// Display refresh rate used to derive the frame budget.
    pub refresh_rate_hz: f64,
    /// Raster cache tuning.
    pub raster_cache: RasterCacheOpts,
}

impl Default for FramepipeOpts {
    fn default() -> Self {
        Self {
            pipeline_depth: DEFAULT_PIPELINE_DEPTH,
            instrumentation: true,
            refresh_rate_hz: DEFAULT_REFRESH_RATE_HZ,
            raster_cache: RasterCacheOpts::default(),
        }
    }
}

impl FramepipeOpts {
    /// Parse options from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramepipeResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| FramepipeError::config(format!("parse framepipe config JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramepipeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramepipeError::config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply `FRAMEPIPE_*` environment overrides on top of these options.
    ///
    /// Recognized variables: `FRAMEPIPE_PIPELINE_DEPTH`, `FRAMEPIPE_INSTRUMENTATION`,
    /// `FRAMEPIPE_REFRESH_RATE_HZ`, `FRAMEPIPE_CACHE_LIMIT_PER_FRAME`,
    /// `FRAMEPIPE_MAX_SURFACE_AGE` and `FRAMEPIPE_ACCESS_THRESHOLD`. Unparseable values are
    /// ignored.
    pub fn with_env_overrides(self) -> FramepipeResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> FramepipeResult<Self> {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse::<T>().ok())
        }

        if let Some(v) = parsed(&lookup, "FRAMEPIPE_PIPELINE_DEPTH") {
            self.pipeline_depth = v;
        }
        if let Some(v) = parsed(&lookup, "FRAMEPIPE_INSTRUMENTATION") {
            self.instrumentation = v;
        }
        if let Some(v) = parsed(&lookup, "FRAMEPIPE_REFRESH_RATE_HZ") {
            self.refresh_rate_hz = v;
        }
        if let Some(v) = parsed(&lookup, "FRAMEPIPE_CACHE_LIMIT_PER_FRAME") {
            self.raster_cache.picture_and_display_list_cache_limit_per_frame = v;
        }
        if let Some(v) = parsed(&lookup, "FRAMEPIPE_MAX_SURFACE_AGE") {
            self.raster_cache.max_surface_age = v;
        }
        if let Some(v) = parsed(&lookup, "FRAMEPIPE_ACCESS_THRESHOLD") {
            self.raster_cache.access_threshold = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> FramepipeResult<()> {
        if self.pipeline_depth == 0 {
            return Err(FramepipeError::validation("pipeline_depth must be >= 1"));
        }
        if !self.refresh_rate_hz.is_finite() || self.refresh_rate_hz <= 0.0 {
            return Err(FramepipeError::validation(
                "refresh_rate_hz must be a positive finite number",
            ));
        }
        self.raster_cache.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
