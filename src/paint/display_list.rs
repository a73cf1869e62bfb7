use crate::foundation::core::{
    Affine, BezPath, Color, Point, Rect, map_rect, next_unique_id,
};
use crate::paint::canvas::{Canvas, TransformStack};
use crate::paint::image::RasterImage;
use kurbo::Shape;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum DisplayOp {
    Save,
    Restore,
    /// Absolute transform, relative to the transform the list is replayed under.
    SetTransform(Affine),
    Clear(Color),
    FillRect(Rect, Color),
    FillPath(Arc<BezPath>, Color),
    DrawImage(RasterImage, Point),
    PushOpacity(f32),
    PopOpacity,
}

/// Immutable recording of drawing commands.
///
/// Every list gets a process-unique id at build time; the raster cache keys on it, so two
/// lists with identical content are still distinct cache entries.
#[derive(Debug)]
pub struct DisplayList {
    unique_id: u64,
    ops: Vec<DisplayOp>,
    bounds: Rect,
    draw_op_count: usize,
}

impl DisplayList {
    /// Process-unique id, stable for the lifetime of the list.
    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }

    /// Union of the local-space bounds of everything drawn.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of recorded drawing operations, used as a complexity score.
    pub fn op_count(&self) -> usize {
        self.draw_op_count
    }

    /// Return `true` if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.draw_op_count == 0
    }

    /// Replay the recording onto `canvas` under its current transform.
    ///
    /// The canvas save depth is restored afterwards even if the recording is unbalanced.
    pub fn render_to(&self, canvas: &mut dyn Canvas) {
        let base = canvas.transform();
        let save_count = canvas.save_count();
        canvas.save();
        let mut opacity_depth = 0usize;
        for op in &self.ops {
            match op {
                DisplayOp::Save => canvas.save(),
                DisplayOp::Restore => {
                    if canvas.save_count() > save_count + 1 {
                        canvas.restore();
                    }
                }
                DisplayOp::SetTransform(t) => canvas.set_transform(base * *t),
                DisplayOp::Clear(c) => canvas.clear(*c),
                DisplayOp::FillRect(r, c) => canvas.fill_rect(*r, *c),
                DisplayOp::FillPath(p, c) => canvas.fill_path(p, *c),
                DisplayOp::DrawImage(img, at) => canvas.draw_image(img, *at),
                DisplayOp::PushOpacity(o) => {
                    opacity_depth += 1;
                    canvas.push_opacity(*o);
                }
                DisplayOp::PopOpacity => {
                    if opacity_depth > 0 {
                        opacity_depth -= 1;
                        canvas.pop_opacity();
                    }
                }
            }
        }
        for _ in 0..opacity_depth {
            canvas.pop_opacity();
        }
        while canvas.save_count() > save_count {
            canvas.restore();
        }
    }
}

/// Recording [`Canvas`] that produces a [`DisplayList`].
#[derive(Debug, Default)]
pub struct DisplayListBuilder {
    ops: Vec<DisplayOp>,
    transforms: TransformStack,
    bounds: Option<Rect>,
    draw_op_count: usize,
}

impl DisplayListBuilder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish recording.
    pub fn build(self) -> Arc<DisplayList> {
        Arc::new(DisplayList {
            unique_id: next_unique_id(),
            ops: self.ops,
            bounds: self.bounds.unwrap_or(Rect::ZERO),
            draw_op_count: self.draw_op_count,
        })
    }

    /// Snapshot the current recording without consuming the builder.
    pub fn snapshot(&self) -> Arc<DisplayList> {
        Arc::new(DisplayList {
            unique_id: next_unique_id(),
            ops: self.ops.clone(),
            bounds: self.bounds.unwrap_or(Rect::ZERO),
            draw_op_count: self.draw_op_count,
        })
    }

    /// Replay another display list into this recording.
    pub fn draw_display_list(&mut self, list: &DisplayList) {
        list.render_to(self);
    }

    fn accumulate(&mut self, local: Rect) {
        self.draw_op_count += 1;
        let mapped = map_rect(self.transforms.current(), local);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(mapped),
            None => mapped,
        });
    }
}

impl Canvas for DisplayListBuilder {
    fn save(&mut self) {
        self.transforms.save();
        self.ops.push(DisplayOp::Save);
    }

    fn restore(&mut self) {
        if self.transforms.restore() {
            self.ops.push(DisplayOp::Restore);
        }
    }

    fn save_count(&self) -> usize {
        self.transforms.depth()
    }

    fn transform(&self) -> Affine {
        self.transforms.current()
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transforms.set(transform);
        self.ops.push(DisplayOp::SetTransform(transform));
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DisplayOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.accumulate(rect);
        self.ops.push(DisplayOp::FillRect(rect, color));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.accumulate(path.bounding_box());
        self.ops.push(DisplayOp::FillPath(Arc::new(path.clone()), color));
    }

    fn draw_image(&mut self, image: &RasterImage, origin: Point) {
        self.accumulate(Rect::new(
            origin.x,
            origin.y,
            origin.x + f64::from(image.width()),
            origin.y + f64::from(image.height()),
        ));
        self.ops.push(DisplayOp::DrawImage(image.clone(), origin));
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.ops.push(DisplayOp::PushOpacity(opacity));
    }

    fn pop_opacity(&mut self) {
        self.ops.push(DisplayOp::PopOpacity);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/display_list.rs"]
mod tests;
