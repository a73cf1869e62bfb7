//! framepipe is the frame compositor of a retained-mode UI renderer.
//!
//! A UI thread builds a [`LayerTree`] per frame and hands it to the raster thread through a
//! bounded, non-blocking [`Pipeline`]. The [`Rasterizer`] consumes it, brackets the frame with
//! a [`ScopedFrame`] from the [`CompositorContext`], prerolls and paints the tree into a
//! [`SurfaceFrame`] (substituting [`RasterCache`] images for stable subtrees), then ends the
//! scope, which sweeps the cache and records timing into [`Stopwatch`]es, and submits the frame.
//!
//! External textures live in a [`TextureRegistry`], which also fans GPU-context lifecycle out
//! to weakly held [`ContextListener`]s.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Per-frame compositing state and the frame scope guard.
pub mod compositor;
/// Frame timing and counters.
pub mod instrumentation;
/// Layer tree and layer types.
pub mod layer;
/// Canvas abstraction, display lists and the CPU raster canvas.
pub mod paint;
/// Bounded UI to raster hand-off.
pub mod pipeline;
/// Cache of rasterized subtrees.
pub mod raster_cache;
/// Raster-thread pipeline consumer.
pub mod rasterizer;
/// Per-frame drawable targets.
pub mod surface;
/// External textures and context listeners.
pub mod texture;

pub use crate::foundation::config::{
    DEFAULT_ACCESS_THRESHOLD, DEFAULT_COMPLEXITY_THRESHOLD, DEFAULT_MAX_SURFACE_AGE,
    DEFAULT_PICTURE_AND_DISPLAY_LIST_CACHE_LIMIT_PER_FRAME, DEFAULT_PIPELINE_DEPTH,
    DEFAULT_REFRESH_RATE_HZ, DEFAULT_SCALE_QUANTIZATION, FramepipeOpts, RasterCacheOpts,
};
pub use crate::foundation::core::{
    Affine, BezPath, Color, FrameSize, Point, Rect, Size, Vec2, map_rect, round_out,
};
pub use crate::foundation::error::{FramepipeError, FramepipeResult};

pub use crate::compositor::{CompositorContext, RasterStatus, ScopedFrame};
pub use crate::instrumentation::{
    Counter, CounterValues, FixedRefreshRateUpdater, RefreshRateUpdater, Stopwatch,
};
pub use crate::layer::{
    ContainerLayer, DisplayListLayer, FrameItem, FrameTimings, Layer, LayerTree, OpacityLayer,
    PaintContext, PrerollContext, TextureLayer, TransformLayer,
};
pub use crate::paint::canvas::Canvas;
pub use crate::paint::display_list::{DisplayList, DisplayListBuilder};
pub use crate::paint::image::RasterImage;
pub use crate::paint::pixmap_canvas::{FrameRGBA, PixmapCanvas};
pub use crate::pipeline::{
    Pipeline, PipelineConsumeResult, PipelineProduceResult, ProducerContinuation,
};
pub use crate::raster_cache::{
    RasterCache, RasterCacheKey, RasterCacheKeyId, RasterCacheKeyKind, RasterCacheMetrics,
    RasterCacheResult,
};
pub use crate::rasterizer::{DrawResult, DrawStatus, LayerTreePipeline, Rasterizer, RasterizerStats};
pub use crate::surface::{
    FramebufferInfo, GpuContext, PresentedFrames, RecordingSurface, SoftwareSurface,
    SoftwareSurfaceDelegate, Surface, SurfaceFrame,
};
pub use crate::texture::{ContextListener, ImageTexture, ListenerId, Texture, TextureRegistry};
