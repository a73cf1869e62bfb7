use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, Vec2};
use crate::paint::image::RasterImage;

/// Immediate-mode drawing target.
///
/// Implemented by the CPU raster canvas and by the display-list recorder, so layers paint
/// without knowing whether they hit pixels or a recording.
pub trait Canvas {
    /// Push the current transform onto the save stack.
    fn save(&mut self);

    /// Pop the save stack. Restoring past the first save is ignored.
    fn restore(&mut self);

    /// Number of outstanding saves.
    fn save_count(&self) -> usize;

    /// Current total transform.
    fn transform(&self) -> Affine;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Pre-concatenate `transform` onto the current transform.
    fn concat(&mut self, transform: Affine) {
        let t = self.transform() * transform;
        self.set_transform(t);
    }

    /// Translate the current transform.
    fn translate(&mut self, offset: Vec2) {
        self.concat(Affine::translate(offset));
    }

    /// Fill the whole target with `color`, ignoring the transform.
    fn clear(&mut self, color: Color);

    /// Fill `rect` (in local coordinates) with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill `path` (in local coordinates) with `color`.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Draw `image` with its top-left corner at `origin` (in local coordinates).
    fn draw_image(&mut self, image: &RasterImage, origin: Point);

    /// Start a group composited with `opacity` when popped.
    fn push_opacity(&mut self, opacity: f32);

    /// Finish the innermost opacity group.
    fn pop_opacity(&mut self);
}

/// Save/restore transform stack shared by canvas implementations.
#[derive(Debug, Clone)]
pub(crate) struct TransformStack {
    current: Affine,
    saved: Vec<Affine>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Affine::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub(crate) fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub(crate) fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(t) => {
                self.current = t;
                true
            }
            None => false,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }

    pub(crate) fn current(&self) -> Affine {
        self.current
    }

    pub(crate) fn set(&mut self, transform: Affine) {
        self.current = transform;
    }
}
