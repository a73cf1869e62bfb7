//! Retained layer tree painted by the compositor.
//!
//! A frame visits the tree twice: `preroll` computes paint bounds and lets layers populate the
//! raster cache, then `paint` emits drawing commands, substituting cached images where
//! available. Each layer's `paint_bounds` is expressed in its parent's coordinate space.

use crate::foundation::core::{Affine, Rect};
use crate::paint::canvas::Canvas;
use crate::raster_cache::RasterCache;
use crate::surface::GpuContext;
use crate::texture::TextureRegistry;

/// Container and transform layers.
pub mod container;
/// Leaf layer replaying a display list.
pub mod display_list_layer;
/// Group opacity layer.
pub mod opacity;
/// Leaf layer painting an external texture.
pub mod texture_layer;
/// Layer tree and pipeline frame item.
pub mod tree;

pub use container::{ContainerLayer, TransformLayer};
pub use display_list_layer::DisplayListLayer;
pub use opacity::OpacityLayer;
pub use texture_layer::TextureLayer;
pub use tree::{FrameItem, FrameTimings, LayerTree};

/// State shared by every layer during preroll.
pub struct PrerollContext<'a> {
    /// Cache to populate, or `None` when caching is bypassed for this frame.
    pub raster_cache: Option<&'a mut RasterCache>,
    /// Registered external textures.
    pub texture_registry: &'a TextureRegistry,
    /// Context the frame draws with.
    pub gr_context: Option<&'a GpuContext>,
    /// Set by any texture layer in the subtree prerolled so far.
    pub has_texture_layer: bool,
}

/// State shared by every layer during paint.
pub struct PaintContext<'a> {
    /// Target canvas.
    pub canvas: &'a mut dyn Canvas,
    /// Cache to draw from, or `None` when caching is bypassed for this frame.
    pub raster_cache: Option<&'a RasterCache>,
    /// Registered external textures.
    pub texture_registry: &'a TextureRegistry,
    /// Context the frame draws with.
    pub gr_context: Option<&'a GpuContext>,
}

/// A node of the layer tree.
pub trait Layer: Send + std::fmt::Debug {
    /// Compute paint bounds under `matrix` (the total transform down to this layer) and
    /// prepare cached rasterizations.
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine);

    /// Emit drawing commands.
    fn paint(&self, context: &mut PaintContext<'_>);

    /// Bounds computed by the last preroll, in the parent's coordinate space.
    fn paint_bounds(&self) -> Rect;

    /// Id stable across frames for the same logical layer.
    fn unique_id(&self) -> u64;

    /// Return `false` when painting would draw nothing.
    fn needs_painting(&self) -> bool {
        let b = self.paint_bounds();
        b.width() > 0.0 && b.height() > 0.0
    }
}
