//! Raster-thread consumer: pulls layer trees from the pipeline and draws them to a surface.

use crate::compositor::{CompositorContext, RasterStatus};
use crate::foundation::config::FramepipeOpts;
use crate::layer::{FrameItem, LayerTree};
use crate::pipeline::{Pipeline, PipelineConsumeResult};
use crate::surface::{GpuContext, Surface};

/// Pipeline carrying frames from the UI thread to the rasterizer.
pub type LayerTreePipeline = Pipeline<FrameItem>;

/// Outcome of one draw attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStatus {
    /// The frame was drawn and submitted.
    Success,
    /// Nothing was queued.
    PipelineEmpty,
    /// No surface is installed; the frame was kept for a later redraw.
    NotSetUp,
    /// The surface could not produce a frame.
    AcquireFailed,
    /// The frame was painted but the surface rejected it.
    SubmitFailed,
    /// The layer tree was empty.
    Discarded,
    /// Painting failed.
    Failed,
}

/// Result of [`Rasterizer::draw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawResult {
    /// What happened to the consumed frame.
    pub status: DrawStatus,
    /// More frames are queued; the caller should draw again.
    pub more_available: bool,
}

/// Frame counters kept by the rasterizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterizerStats {
    /// Frames drawn and submitted.
    pub frames_drawn: u64,
    /// Frames consumed but not shown.
    pub frames_dropped: u64,
}

/// Draws frames from a [`LayerTreePipeline`] onto an installed [`Surface`].
pub struct Rasterizer {
    compositor: CompositorContext,
    surface: Option<Box<dyn Surface>>,
    gr_context: Option<GpuContext>,
    last_layer_tree: Option<LayerTree>,
    instrumentation: bool,
    stats: RasterizerStats,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("has_surface", &self.surface.is_some())
            .field("gr_context", &self.gr_context)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Rasterizer {
    /// Create a rasterizer with a fresh compositor context.
    pub fn new(opts: FramepipeOpts) -> Self {
        Self::with_compositor_context(CompositorContext::new(opts))
    }

    /// Create a rasterizer around an existing compositor context.
    pub fn with_compositor_context(compositor: CompositorContext) -> Self {
        let instrumentation = compositor.opts().instrumentation;
        Self {
            compositor,
            surface: None,
            gr_context: None,
            last_layer_tree: None,
            instrumentation,
            stats: RasterizerStats::default(),
        }
    }

    /// Install `surface` and announce its context.
    pub fn setup(&mut self, surface: Box<dyn Surface>) {
        if self.surface.is_some() {
            self.teardown_surface();
        }
        self.gr_context = surface.gpu_context();
        self.surface = Some(surface);
        tracing::debug!(gr_context = ?self.gr_context, "rasterizer set up");
        self.compositor.on_gr_context_created();
    }

    /// Release the surface: clear the raster cache, notify the texture registry, then drop
    /// the surface and the retained layer tree.
    pub fn teardown(&mut self) {
        self.teardown_surface();
        self.last_layer_tree = None;
    }

    fn teardown_surface(&mut self) {
        if self.surface.is_none() {
            return;
        }
        self.compositor.on_gr_context_destroyed();
        self.surface = None;
        self.gr_context = None;
        tracing::debug!("rasterizer torn down");
    }

    /// Consume one frame from `pipeline` and draw it.
    #[tracing::instrument(skip_all)]
    pub fn draw(&mut self, pipeline: &LayerTreePipeline) -> DrawResult {
        let mut consumed = None;
        let result = pipeline.consume(|item| consumed = Some(item));
        let more_available = result == PipelineConsumeResult::MoreAvailable;
        let Some(item) = consumed else {
            return DrawResult {
                status: DrawStatus::PipelineEmpty,
                more_available: false,
            };
        };

        self.compositor
            .engine_time_mut()
            .set_lap_time(item.timings.build_duration());

        let mut tree = item.layer_tree;
        let status = self.draw_to_surface(&mut tree);
        self.last_layer_tree = Some(tree);
        self.record(status);
        DrawResult {
            status,
            more_available,
        }
    }

    /// Draw the most recently consumed layer tree again.
    pub fn draw_last_layer_tree(&mut self) -> DrawStatus {
        let Some(mut tree) = self.last_layer_tree.take() else {
            return DrawStatus::Discarded;
        };
        let status = self.draw_to_surface(&mut tree);
        self.last_layer_tree = Some(tree);
        self.record(status);
        status
    }

    fn draw_to_surface(&mut self, tree: &mut LayerTree) -> DrawStatus {
        let Some(surface) = self.surface.as_mut() else {
            return DrawStatus::NotSetUp;
        };
        if !surface.is_valid() {
            return DrawStatus::AcquireFailed;
        }
        let Some(mut frame) = surface.acquire_frame(tree.frame_size()) else {
            tracing::warn!(frame_size = ?tree.frame_size(), "surface frame acquisition failed");
            return DrawStatus::AcquireFailed;
        };
        let root_transformation = surface.root_transformation();

        let raster_status = {
            let mut scoped = self.compositor.acquire_frame(
                self.gr_context.as_ref(),
                frame.canvas(),
                root_transformation,
                self.instrumentation,
            );
            scoped.raster(tree, false)
        };

        match raster_status {
            RasterStatus::Success => {
                if frame.submit() {
                    DrawStatus::Success
                } else {
                    DrawStatus::SubmitFailed
                }
            }
            RasterStatus::Discarded => DrawStatus::Discarded,
            RasterStatus::Failed => DrawStatus::Failed,
        }
    }

    fn record(&mut self, status: DrawStatus) {
        match status {
            DrawStatus::Success => self.stats.frames_drawn += 1,
            DrawStatus::PipelineEmpty => {}
            _ => self.stats.frames_dropped += 1,
        }
    }

    /// Return `true` while a surface is installed.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Tree retained for [`Rasterizer::draw_last_layer_tree`].
    pub fn last_layer_tree(&self) -> Option<&LayerTree> {
        self.last_layer_tree.as_ref()
    }

    /// Frame counters.
    pub fn stats(&self) -> RasterizerStats {
        self.stats
    }

    /// The compositor context.
    pub fn compositor(&self) -> &CompositorContext {
        &self.compositor
    }

    /// The compositor context, mutably.
    pub fn compositor_mut(&mut self) -> &mut CompositorContext {
        &mut self.compositor
    }
}
