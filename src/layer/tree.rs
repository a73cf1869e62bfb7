use crate::foundation::core::{Affine, FrameSize};
use crate::layer::container::ContainerLayer;
use crate::layer::{Layer, PaintContext, PrerollContext};
use std::time::{Duration, Instant};

/// A complete frame's worth of layers.
#[derive(Debug)]
pub struct LayerTree {
    root: ContainerLayer,
    frame_size: FrameSize,
    device_pixel_ratio: f32,
}

impl LayerTree {
    /// Wrap `root` for a frame of `frame_size` physical pixels.
    pub fn new(root: ContainerLayer, frame_size: FrameSize, device_pixel_ratio: f32) -> Self {
        Self {
            root,
            frame_size,
            device_pixel_ratio,
        }
    }

    /// Root layer.
    pub fn root(&self) -> &ContainerLayer {
        &self.root
    }

    /// Physical frame size.
    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Logical to physical pixel ratio.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Return `true` if there is nothing to raster.
    pub fn is_empty(&self) -> bool {
        self.frame_size.is_empty() || self.root.is_empty()
    }

    /// Preroll the whole tree under `root_matrix`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn preroll(&mut self, context: &mut PrerollContext<'_>, root_matrix: Affine) {
        self.root.preroll(context, root_matrix);
    }

    /// Paint the whole tree.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn paint(&self, context: &mut PaintContext<'_>) {
        if self.root.needs_painting() {
            self.root.paint(context);
        }
    }
}

/// When the UI thread worked on a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTimings {
    /// Vsync that triggered the frame.
    pub vsync_start: Instant,
    /// Layer tree build started.
    pub build_start: Instant,
    /// Layer tree build finished.
    pub build_end: Instant,
    /// When the frame should be on screen.
    pub target_time: Instant,
}

impl FrameTimings {
    /// Timings for a frame whose build spans `build_start..build_end`, due one `frame_budget`
    /// after `build_start`.
    pub fn new(build_start: Instant, build_end: Instant, frame_budget: Duration) -> Self {
        Self {
            vsync_start: build_start,
            build_start,
            build_end,
            target_time: build_start + frame_budget,
        }
    }

    /// Time spent building the layer tree.
    pub fn build_duration(&self) -> Duration {
        self.build_end.saturating_duration_since(self.build_start)
    }
}

/// Resource flowing through the UI to raster pipeline.
#[derive(Debug)]
pub struct FrameItem {
    /// Tree to raster.
    pub layer_tree: LayerTree,
    /// Build timings, reported into the engine-time stopwatch.
    pub timings: FrameTimings,
}

impl FrameItem {
    /// Pair a tree with its timings.
    pub fn new(layer_tree: LayerTree, timings: FrameTimings) -> Self {
        Self { layer_tree, timings }
    }
}
