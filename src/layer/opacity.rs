use crate::foundation::core::{Affine, Rect, Vec2, next_unique_id};
use crate::layer::container::ContainerLayer;
use crate::layer::{Layer, PaintContext, PrerollContext};
use crate::raster_cache::RasterCacheKeyId;

/// Layer that composites its children as a group with uniform opacity.
///
/// Once the same children have been seen for `access_threshold` consecutive frames they are
/// rasterized together under a `LayerChildren` cache key, so later frames blit one image
/// instead of repainting the subtree. Subtrees containing texture layers are never cached.
#[derive(Debug)]
pub struct OpacityLayer {
    opacity: f32,
    offset: Vec2,
    children: ContainerLayer,
    children_bounds: Rect,
    cache_id: Option<RasterCacheKeyId>,
}

impl OpacityLayer {
    /// Create an opacity layer with a fresh id. `opacity` is clamped to `0..=1`.
    pub fn new(opacity: f32, offset: Vec2) -> Self {
        Self::with_unique_id(opacity, offset, next_unique_id())
    }

    /// Create an opacity layer with a caller-chosen id.
    pub fn with_unique_id(opacity: f32, offset: Vec2, id: u64) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            offset,
            children: ContainerLayer::with_unique_id(id),
            children_bounds: Rect::ZERO,
            cache_id: None,
        }
    }

    /// Append a child.
    pub fn add(&mut self, child: impl Layer + 'static) {
        self.children.add(child);
    }

    /// Builder form of [`OpacityLayer::add`].
    pub fn with_child(mut self, child: impl Layer + 'static) -> Self {
        self.add(child);
        self
    }

    /// Group opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Key the children were cached under during the last preroll, if any.
    pub fn children_cache_id(&self) -> Option<RasterCacheKeyId> {
        self.cache_id
    }
}

impl Layer for OpacityLayer {
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) {
        let child_matrix = matrix * Affine::translate(self.offset);
        let outer_has_texture = std::mem::take(&mut context.has_texture_layer);
        self.children_bounds = self.children.preroll_children(context, child_matrix);
        let subtree_has_texture = context.has_texture_layer;
        context.has_texture_layer = outer_has_texture || subtree_has_texture;

        self.cache_id = None;
        if subtree_has_texture || self.children.is_empty() {
            return;
        }
        let Some(cache) = context.raster_cache.as_deref_mut() else {
            return;
        };
        let id = RasterCacheKeyId::from_children(self.children.child_ids());
        if cache.mark_seen(id) < cache.opts().access_threshold {
            return;
        }

        let registry = context.texture_registry;
        let gr_context = context.gr_context;
        let children = &self.children;
        let prepared = cache.prepare(id, child_matrix, self.children_bounds, |canvas| {
            let mut offscreen = PaintContext {
                canvas,
                raster_cache: None,
                texture_registry: registry,
                gr_context,
            };
            children.paint_children(&mut offscreen);
        });
        if prepared.is_some() {
            self.cache_id = Some(id);
        }
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        context.canvas.save();
        context.canvas.translate(self.offset);
        let group = self.opacity < 1.0;
        if group {
            context.canvas.push_opacity(self.opacity);
        }

        let drawn_from_cache = match (context.raster_cache, self.cache_id) {
            (Some(cache), Some(id)) => cache.draw(id, context.canvas),
            _ => false,
        };
        if !drawn_from_cache {
            self.children.paint_children(context);
        }

        if group {
            context.canvas.pop_opacity();
        }
        context.canvas.restore();
    }

    fn paint_bounds(&self) -> Rect {
        self.children_bounds + self.offset
    }

    fn unique_id(&self) -> u64 {
        self.children.unique_id()
    }

    fn needs_painting(&self) -> bool {
        self.opacity > 0.0
            && self.children_bounds.width() > 0.0
            && self.children_bounds.height() > 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/opacity.rs"]
mod tests;
