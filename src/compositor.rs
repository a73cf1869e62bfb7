//! Per-frame compositing state shared across frames on the raster thread.

use crate::foundation::config::FramepipeOpts;
use crate::foundation::core::{Affine, Color};
use crate::instrumentation::{
    Counter, CounterValues, FixedRefreshRateUpdater, RefreshRateUpdater, Stopwatch,
};
use crate::layer::{LayerTree, PaintContext, PrerollContext};
use crate::paint::canvas::Canvas;
use crate::raster_cache::RasterCache;
use crate::surface::GpuContext;
use crate::texture::TextureRegistry;
use std::sync::Arc;

/// Outcome of rastering a layer tree into a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterStatus {
    /// The tree was painted.
    Success,
    /// There was nothing to paint into.
    Failed,
    /// The tree was empty; nothing was painted.
    Discarded,
}

/// Owns the raster cache, texture registry and frame instrumentation.
///
/// Lives on the raster thread. Each frame is bracketed by a [`ScopedFrame`].
#[derive(Debug)]
pub struct CompositorContext {
    opts: FramepipeOpts,
    raster_cache: RasterCache,
    texture_registry: Arc<TextureRegistry>,
    frame_time: Stopwatch,
    engine_time: Stopwatch,
    frame_count: Counter,
    cache_bytes: CounterValues,
}

impl Default for CompositorContext {
    fn default() -> Self {
        Self::new(FramepipeOpts::default())
    }
}

impl CompositorContext {
    /// Create a context with a fixed refresh rate taken from `opts`.
    pub fn new(opts: FramepipeOpts) -> Self {
        let updater = Arc::new(FixedRefreshRateUpdater::new(opts.refresh_rate_hz));
        Self::with_refresh_rate_updater(opts, updater)
    }

    /// Create a context whose stopwatches budget frames with `updater`.
    pub fn with_refresh_rate_updater(
        opts: FramepipeOpts,
        updater: Arc<dyn RefreshRateUpdater>,
    ) -> Self {
        Self {
            raster_cache: RasterCache::new(opts.raster_cache),
            texture_registry: Arc::new(TextureRegistry::new()),
            frame_time: Stopwatch::new(Arc::clone(&updater)),
            engine_time: Stopwatch::new(updater),
            frame_count: Counter::default(),
            cache_bytes: CounterValues::default(),
            opts,
        }
    }

    /// Share an existing texture registry instead of the context's own.
    pub fn with_texture_registry(mut self, registry: Arc<TextureRegistry>) -> Self {
        self.texture_registry = registry;
        self
    }

    /// Begin a frame. The returned guard ends it when dropped.
    pub fn acquire_frame<'a>(
        &'a mut self,
        gr_context: Option<&'a GpuContext>,
        canvas: Option<&'a mut dyn Canvas>,
        root_surface_transformation: Affine,
        instrumentation_enabled: bool,
    ) -> ScopedFrame<'a> {
        self.begin_frame(instrumentation_enabled);
        ScopedFrame {
            context: self,
            gr_context,
            canvas,
            root_surface_transformation,
            instrumentation_enabled,
        }
    }

    /// Forward GPU-context creation to the texture registry.
    pub fn on_gr_context_created(&mut self) {
        tracing::debug!("compositor gpu context created");
        self.texture_registry.on_gr_context_created();
    }

    /// Drop cached rasterizations, then forward GPU-context destruction to the registry.
    pub fn on_gr_context_destroyed(&mut self) {
        tracing::debug!("compositor gpu context destroyed");
        self.raster_cache.clear();
        self.texture_registry.on_gr_context_destroyed();
    }

    /// Options the context was built with.
    pub fn opts(&self) -> &FramepipeOpts {
        &self.opts
    }

    /// The raster cache.
    pub fn raster_cache(&self) -> &RasterCache {
        &self.raster_cache
    }

    /// The raster cache, mutably.
    pub fn raster_cache_mut(&mut self) -> &mut RasterCache {
        &mut self.raster_cache
    }

    /// Shared texture registry.
    pub fn texture_registry(&self) -> &Arc<TextureRegistry> {
        &self.texture_registry
    }

    /// Raster time per frame.
    pub fn frame_time(&self) -> &Stopwatch {
        &self.frame_time
    }

    /// UI-thread build time per frame, as reported by the rasterizer.
    pub fn engine_time(&self) -> &Stopwatch {
        &self.engine_time
    }

    /// Mutable access for recording build times.
    pub fn engine_time_mut(&mut self) -> &mut Stopwatch {
        &mut self.engine_time
    }

    /// Frames begun so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.count()
    }

    /// Raster cache bytes sampled at the end of each instrumented frame.
    pub fn cache_bytes(&self) -> &CounterValues {
        &self.cache_bytes
    }

    fn begin_frame(&mut self, instrumentation_enabled: bool) {
        self.frame_count.increment(1);
        if instrumentation_enabled {
            self.frame_time.start();
        }
    }

    fn end_frame(&mut self, instrumentation_enabled: bool) {
        self.raster_cache.sweep_after_frame();
        if instrumentation_enabled {
            let bytes = i64::try_from(self.raster_cache.estimate_byte_size()).unwrap_or(i64::MAX);
            self.cache_bytes.add(bytes);
            self.frame_time.stop();
        }
    }
}

/// One frame in progress. Dropping it sweeps the raster cache and stops frame timing,
/// whether or not the frame was rastered or submitted.
pub struct ScopedFrame<'a> {
    context: &'a mut CompositorContext,
    gr_context: Option<&'a GpuContext>,
    canvas: Option<&'a mut dyn Canvas>,
    root_surface_transformation: Affine,
    instrumentation_enabled: bool,
}

impl std::fmt::Debug for ScopedFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedFrame")
            .field("has_canvas", &self.canvas.is_some())
            .field("gr_context", &self.gr_context)
            .field("root_surface_transformation", &self.root_surface_transformation)
            .field("instrumentation_enabled", &self.instrumentation_enabled)
            .finish()
    }
}

impl ScopedFrame<'_> {
    /// Preroll and paint `layer_tree` into the frame's canvas.
    ///
    /// With `ignore_raster_cache` set the cache is neither populated nor consulted.
    #[tracing::instrument(skip_all, fields(frame = self.context.frame_count.count()))]
    pub fn raster(&mut self, layer_tree: &mut LayerTree, ignore_raster_cache: bool) -> RasterStatus {
        if layer_tree.is_empty() {
            tracing::debug!("empty layer tree discarded");
            return RasterStatus::Discarded;
        }

        let context = &mut *self.context;
        let mut preroll = PrerollContext {
            raster_cache: (!ignore_raster_cache).then_some(&mut context.raster_cache),
            texture_registry: &context.texture_registry,
            gr_context: self.gr_context,
            has_texture_layer: false,
        };
        layer_tree.preroll(&mut preroll, self.root_surface_transformation);

        let Some(canvas) = self.canvas.as_deref_mut() else {
            tracing::warn!("scoped frame has no canvas to raster into");
            return RasterStatus::Failed;
        };
        canvas.clear(Color::TRANSPARENT);
        canvas.save();
        canvas.concat(self.root_surface_transformation);
        let mut paint = PaintContext {
            canvas,
            raster_cache: (!ignore_raster_cache).then_some(&context.raster_cache),
            texture_registry: &context.texture_registry,
            gr_context: self.gr_context,
        };
        layer_tree.paint(&mut paint);
        paint.canvas.restore();
        RasterStatus::Success
    }

    /// The frame's canvas, if any.
    pub fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        match self.canvas.as_deref_mut() {
            Some(canvas) => Some(canvas),
            None => None,
        }
    }

    /// Context the frame draws with.
    pub fn gr_context(&self) -> Option<&GpuContext> {
        self.gr_context
    }

    /// Transform applied at the root of the frame.
    pub fn root_surface_transformation(&self) -> Affine {
        self.root_surface_transformation
    }

    /// Return `true` if timing is recorded for this frame.
    pub fn instrumentation_enabled(&self) -> bool {
        self.instrumentation_enabled
    }

    /// The owning compositor context.
    pub fn context(&self) -> &CompositorContext {
        self.context
    }
}

impl Drop for ScopedFrame<'_> {
    fn drop(&mut self) {
        self.context.end_frame(self.instrumentation_enabled);
    }
}

#[cfg(test)]
#[path = "../tests/unit/compositor.rs"]
mod tests;
