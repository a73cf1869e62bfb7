use crate::foundation::core::{Affine, Point, Rect, Size, next_unique_id};
use crate::layer::{Layer, PaintContext, PrerollContext};

/// Leaf layer painting a registered external texture into a fixed rect.
#[derive(Debug)]
pub struct TextureLayer {
    id: u64,
    texture_id: i64,
    bounds: Rect,
    freeze: bool,
}

impl TextureLayer {
    /// Paint texture `texture_id` at `offset` with `size`.
    pub fn new(texture_id: i64, offset: Point, size: Size) -> Self {
        Self {
            id: next_unique_id(),
            texture_id,
            bounds: Rect::from_origin_size(offset, size),
            freeze: false,
        }
    }

    /// Keep showing the last painted frame instead of latching new ones.
    pub fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    /// Registry id of the painted texture.
    pub fn texture_id(&self) -> i64 {
        self.texture_id
    }
}

impl Layer for TextureLayer {
    fn preroll(&mut self, context: &mut PrerollContext<'_>, _matrix: Affine) {
        context.has_texture_layer = true;
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        match context.texture_registry.get_texture(self.texture_id) {
            Some(texture) => texture.paint(context.canvas, self.bounds, self.freeze),
            None => tracing::trace!(texture_id = self.texture_id, "texture not registered"),
        }
    }

    fn paint_bounds(&self) -> Rect {
        self.bounds
    }

    fn unique_id(&self) -> u64 {
        self.id
    }
}
