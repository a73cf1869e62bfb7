use crate::foundation::core::{Affine, Rect, Vec2};
use crate::layer::{Layer, PaintContext, PrerollContext};
use crate::paint::display_list::DisplayList;
use crate::raster_cache::{RasterCacheKeyId, RasterCacheKeyKind};
use std::sync::Arc;

/// Leaf layer that replays a recorded [`DisplayList`] at an offset.
///
/// The display list's own id is the layer id and the cache id, so the UI side keeps hitting
/// the cache as long as it reuses the same `Arc<DisplayList>` across frames.
#[derive(Debug)]
pub struct DisplayListLayer {
    offset: Vec2,
    display_list: Arc<DisplayList>,
    is_complex: bool,
    will_change: bool,
    paint_bounds: Rect,
}

impl DisplayListLayer {
    /// Create a layer drawing `display_list` translated by `offset`.
    pub fn new(offset: Vec2, display_list: Arc<DisplayList>) -> Self {
        let paint_bounds = display_list.bounds() + offset;
        Self {
            offset,
            display_list,
            is_complex: false,
            will_change: false,
            paint_bounds,
        }
    }

    /// Hint that the content is expensive enough to cache regardless of its op count.
    pub fn with_is_complex(mut self, is_complex: bool) -> Self {
        self.is_complex = is_complex;
        self
    }

    /// Hint that the content changes every frame and must never be cached.
    pub fn with_will_change(mut self, will_change: bool) -> Self {
        self.will_change = will_change;
        self
    }

    /// The replayed recording.
    pub fn display_list(&self) -> &Arc<DisplayList> {
        &self.display_list
    }

    /// Cache id of the recording.
    pub fn cache_id(&self) -> RasterCacheKeyId {
        RasterCacheKeyId::new(self.display_list.unique_id(), RasterCacheKeyKind::DisplayList)
    }

    fn is_worth_rasterizing(&self, complexity_threshold: usize) -> bool {
        if self.will_change || self.display_list.is_empty() {
            return false;
        }
        self.is_complex || self.display_list.op_count() > complexity_threshold
    }
}

impl Layer for DisplayListLayer {
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) {
        self.paint_bounds = self.display_list.bounds() + self.offset;

        let Some(cache) = context.raster_cache.as_deref_mut() else {
            return;
        };
        if !self.is_worth_rasterizing(cache.opts().complexity_threshold) {
            return;
        }
        let id = self.cache_id();
        if cache.mark_seen(id) < cache.opts().access_threshold {
            return;
        }
        let list = &self.display_list;
        if cache
            .prepare(id, matrix * Affine::translate(self.offset), list.bounds(), |canvas| {
                list.render_to(canvas)
            })
            .is_none()
        {
            tracing::trace!(?id, "display list left uncached this frame");
        }
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        context.canvas.save();
        context.canvas.translate(self.offset);
        let drawn_from_cache = context
            .raster_cache
            .is_some_and(|cache| cache.draw(self.cache_id(), context.canvas));
        if !drawn_from_cache {
            self.display_list.render_to(context.canvas);
        }
        context.canvas.restore();
    }

    fn paint_bounds(&self) -> Rect {
        self.paint_bounds
    }

    fn unique_id(&self) -> u64 {
        self.display_list.unique_id()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/display_list_layer.rs"]
mod tests;
