use crate::foundation::config::RasterCacheOpts;
use crate::foundation::core::{Affine, Point, Rect, map_rect, round_out};
use crate::paint::canvas::Canvas;
use crate::paint::image::RasterImage;
use crate::paint::pixmap_canvas::PixmapCanvas;
use crate::raster_cache::key::{RasterCacheKey, RasterCacheKeyId, RasterCacheKeyKind};
use std::collections::HashMap;

/// A rasterized subtree together with the geometry it was rendered for.
#[derive(Clone, Debug)]
pub struct RasterCacheResult {
    image: RasterImage,
    logical_rect: Rect,
    device_rect: Rect,
}

impl RasterCacheResult {
    /// The cached pixels.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Local-space bounds the image covers.
    pub fn logical_rect(&self) -> Rect {
        self.logical_rect
    }

    /// Rounded-out device bounds at rasterization time.
    pub fn device_rect(&self) -> Rect {
        self.device_rect
    }

    /// Blit the image in device space at the rounded-out bounds of `logical_rect` under the
    /// canvas's current transform.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let bounds = round_out(map_rect(canvas.transform(), self.logical_rect));
        canvas.save();
        canvas.set_transform(Affine::IDENTITY);
        canvas.draw_image(&self.image, Point::new(bounds.x0, bounds.y0));
        canvas.restore();
    }
}

/// Counters describing cache population and the most recent sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterCacheMetrics {
    /// Entries evicted by the last sweep.
    pub eviction_count: usize,
    /// Bytes released by the last sweep.
    pub eviction_bytes: usize,
    /// Entries currently cached.
    pub in_use_count: usize,
    /// Bytes currently cached.
    pub in_use_bytes: usize,
}

#[derive(Debug)]
struct Entry {
    result: RasterCacheResult,
    used_this_frame: bool,
    age: u32,
}

#[derive(Debug, Default)]
struct SeenEntry {
    consecutive_frames: u32,
    used_this_frame: bool,
    age: u32,
}

/// Age-swept cache of rasterized subtrees.
///
/// Frame protocol: any number of [`RasterCache::mark_seen`] / [`RasterCache::prepare`] /
/// [`RasterCache::draw`] calls, then exactly one [`RasterCache::sweep_after_frame`]. Entries not
/// touched by `prepare` during `max_surface_age` consecutive frames are evicted.
#[derive(Debug)]
pub struct RasterCache {
    opts: RasterCacheOpts,
    entries: HashMap<RasterCacheKey, Entry>,
    seen: HashMap<RasterCacheKeyId, SeenEntry>,
    created_this_frame: usize,
    sweeps: u64,
    last_sweep: RasterCacheMetrics,
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new(RasterCacheOpts::default())
    }
}

impl RasterCache {
    /// Create an empty cache.
    pub fn new(opts: RasterCacheOpts) -> Self {
        Self {
            opts,
            entries: HashMap::new(),
            seen: HashMap::new(),
            created_this_frame: 0,
            sweeps: 0,
            last_sweep: RasterCacheMetrics::default(),
        }
    }

    /// Tuning in effect.
    pub fn opts(&self) -> &RasterCacheOpts {
        &self.opts
    }

    /// Build the cache key for `id` drawn under `matrix`.
    pub fn key_for(&self, id: RasterCacheKeyId, matrix: Affine) -> RasterCacheKey {
        RasterCacheKey::with_quantization(id, matrix, self.opts.scale_quantization)
    }

    /// Record that `id` was visited this frame; returns how many consecutive frames (including
    /// this one) it has been visited.
    pub fn mark_seen(&mut self, id: RasterCacheKeyId) -> u32 {
        let seen = self.seen.entry(id).or_default();
        if !seen.used_this_frame {
            seen.used_this_frame = true;
            seen.consecutive_frames = seen.consecutive_frames.saturating_add(1);
        }
        seen.consecutive_frames
    }

    /// Return a cached rasterization of `id` under `matrix`, creating it with `draw` on a miss.
    ///
    /// `draw` paints the content in local coordinates; `logical_rect` bounds it. Creation is
    /// skipped (returning `None`) once this frame has already created
    /// `picture_and_display_list_cache_limit_per_frame` entries, or when the device bounds are
    /// empty or too large for an offscreen surface.
    pub fn prepare(
        &mut self,
        id: RasterCacheKeyId,
        matrix: Affine,
        logical_rect: Rect,
        draw: impl FnOnce(&mut dyn Canvas),
    ) -> Option<RasterCacheResult> {
        let key = self.key_for(id, matrix);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.used_this_frame = true;
            return Some(entry.result.clone());
        }

        if self.created_this_frame >= self.opts.picture_and_display_list_cache_limit_per_frame {
            tracing::trace!(?id, "raster cache creation budget exhausted for this frame");
            return None;
        }

        let device_rect = round_out(map_rect(matrix, logical_rect));
        if !is_rasterizable(device_rect) {
            return None;
        }

        let (w, h) = (device_rect.width() as u32, device_rect.height() as u32);
        let mut canvas = match PixmapCanvas::new(w, h) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(?id, error = %e, "raster cache offscreen allocation failed");
                return None;
            }
        };
        canvas.set_transform(Affine::translate((-device_rect.x0, -device_rect.y0)) * matrix);
        draw(&mut canvas);

        let result = RasterCacheResult {
            image: canvas.into_image(),
            logical_rect,
            device_rect,
        };
        self.created_this_frame += 1;
        self.entries.insert(
            key,
            Entry {
                result: result.clone(),
                used_this_frame: true,
                age: 0,
            },
        );
        Some(result)
    }

    /// Draw the cached image for `id` under the canvas's current transform.
    ///
    /// Returns `false` when nothing is cached for that transform; the caller paints live.
    pub fn draw(&self, id: RasterCacheKeyId, canvas: &mut dyn Canvas) -> bool {
        let key = self.key_for(id, canvas.transform());
        match self.entries.get(&key) {
            Some(entry) => {
                entry.result.draw(canvas);
                true
            }
            None => false,
        }
    }

    /// Return `true` if `id` is cached for `matrix`.
    pub fn contains(&self, id: RasterCacheKeyId, matrix: Affine) -> bool {
        self.entries.contains_key(&self.key_for(id, matrix))
    }

    /// Age unused entries, evict stale ones and reset per-frame state.
    pub fn sweep_after_frame(&mut self) {
        let max_age = self.opts.max_surface_age;
        let mut eviction_count = 0usize;
        let mut eviction_bytes = 0usize;

        self.entries.retain(|_, entry| {
            if entry.used_this_frame {
                entry.used_this_frame = false;
                entry.age = 0;
                return true;
            }
            entry.age = entry.age.saturating_add(1);
            if entry.age >= max_age {
                eviction_count += 1;
                eviction_bytes += entry.result.image.byte_size();
                return false;
            }
            true
        });

        self.seen.retain(|_, seen| {
            if seen.used_this_frame {
                seen.used_this_frame = false;
                seen.age = 0;
                return true;
            }
            seen.consecutive_frames = 0;
            seen.age = seen.age.saturating_add(1);
            seen.age < max_age
        });

        self.created_this_frame = 0;
        self.sweeps += 1;
        self.last_sweep = RasterCacheMetrics {
            eviction_count,
            eviction_bytes,
            in_use_count: self.entries.len(),
            in_use_bytes: self.estimate_byte_size(),
        };
        if eviction_count > 0 {
            tracing::debug!(
                sweep = self.sweeps,
                eviction_count,
                eviction_bytes,
                remaining = self.entries.len(),
                "raster cache evicted stale entries"
            );
        }
    }

    /// Evict everything immediately and forget visit streaks.
    pub fn clear(&mut self) {
        let n = self.entries.len();
        self.entries.clear();
        self.seen.clear();
        tracing::debug!(evicted = n, "raster cache cleared");
    }

    /// Number of cached entries.
    pub fn cached_entries_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries created during the current frame.
    pub fn created_this_frame(&self) -> usize {
        self.created_this_frame
    }

    /// Entries caching layers or layer children.
    pub fn layer_cached_entries_count(&self) -> usize {
        self.entries
            .keys()
            .filter(|k| k.id().kind() != RasterCacheKeyKind::DisplayList)
            .count()
    }

    /// Entries caching display lists.
    pub fn display_list_cached_entries_count(&self) -> usize {
        self.entries
            .keys()
            .filter(|k| k.id().kind() == RasterCacheKeyKind::DisplayList)
            .count()
    }

    /// Bytes held by all cached images.
    pub fn estimate_byte_size(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.result.image.byte_size())
            .sum()
    }

    /// Current population plus the eviction figures of the last sweep.
    pub fn metrics(&self) -> RasterCacheMetrics {
        RasterCacheMetrics {
            in_use_count: self.entries.len(),
            in_use_bytes: self.estimate_byte_size(),
            ..self.last_sweep
        }
    }

    /// Number of sweeps performed so far.
    pub fn sweep_count(&self) -> u64 {
        self.sweeps
    }
}

fn is_rasterizable(device_rect: Rect) -> bool {
    let max = f64::from(u16::MAX);
    device_rect.is_finite()
        && device_rect.width() >= 1.0
        && device_rect.height() >= 1.0
        && device_rect.width() <= max
        && device_rect.height() <= max
}

#[cfg(test)]
#[path = "../../tests/unit/raster_cache/cache.rs"]
mod tests;
