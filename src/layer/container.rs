use crate::foundation::core::{Affine, Rect, map_rect, next_unique_id};
use crate::layer::{Layer, PaintContext, PrerollContext};

/// Layer that groups children without drawing anything itself.
#[derive(Debug)]
pub struct ContainerLayer {
    id: u64,
    children: Vec<Box<dyn Layer>>,
    paint_bounds: Rect,
}

impl Default for ContainerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLayer {
    /// Create an empty container with a fresh id.
    pub fn new() -> Self {
        Self::with_unique_id(next_unique_id())
    }

    /// Create an empty container with a caller-chosen id.
    pub fn with_unique_id(id: u64) -> Self {
        Self {
            id,
            children: Vec::new(),
            paint_bounds: Rect::ZERO,
        }
    }

    /// Append a child.
    pub fn add(&mut self, child: impl Layer + 'static) {
        self.children.push(Box::new(child));
    }

    /// Builder form of [`ContainerLayer::add`].
    pub fn with_child(mut self, child: impl Layer + 'static) -> Self {
        self.add(child);
        self
    }

    /// Children in paint order.
    pub fn children(&self) -> &[Box<dyn Layer>] {
        &self.children
    }

    /// Return `true` if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Ids of the children, in paint order.
    pub fn child_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.children.iter().map(|c| c.unique_id())
    }

    /// Preroll every child under `matrix` and return the union of their bounds.
    pub fn preroll_children(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) -> Rect {
        let mut bounds: Option<Rect> = None;
        for child in &mut self.children {
            child.preroll(context, matrix);
            if !child.needs_painting() {
                continue;
            }
            let child_bounds = child.paint_bounds();
            bounds = Some(match bounds {
                Some(b) => b.union(child_bounds),
                None => child_bounds,
            });
        }
        bounds.unwrap_or(Rect::ZERO)
    }

    /// Paint every child that has something to draw.
    pub fn paint_children(&self, context: &mut PaintContext<'_>) {
        for child in &self.children {
            if child.needs_painting() {
                child.paint(context);
            }
        }
    }
}

impl Layer for ContainerLayer {
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) {
        self.paint_bounds = self.preroll_children(context, matrix);
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        self.paint_children(context);
    }

    fn paint_bounds(&self) -> Rect {
        self.paint_bounds
    }

    fn unique_id(&self) -> u64 {
        self.id
    }
}

/// Layer that applies a transform to its children.
#[derive(Debug)]
pub struct TransformLayer {
    transform: Affine,
    children: ContainerLayer,
    paint_bounds: Rect,
}

impl TransformLayer {
    /// Create a transform layer with a fresh id.
    pub fn new(transform: Affine) -> Self {
        Self::with_unique_id(transform, next_unique_id())
    }

    /// Create a transform layer with a caller-chosen id.
    pub fn with_unique_id(transform: Affine, id: u64) -> Self {
        Self {
            transform,
            children: ContainerLayer::with_unique_id(id),
            paint_bounds: Rect::ZERO,
        }
    }

    /// Append a child.
    pub fn add(&mut self, child: impl Layer + 'static) {
        self.children.add(child);
    }

    /// Builder form of [`TransformLayer::add`].
    pub fn with_child(mut self, child: impl Layer + 'static) -> Self {
        self.add(child);
        self
    }

    /// Transform applied to the children.
    pub fn transform(&self) -> Affine {
        self.transform
    }
}

impl Layer for TransformLayer {
    fn preroll(&mut self, context: &mut PrerollContext<'_>, matrix: Affine) {
        let child_bounds = self
            .children
            .preroll_children(context, matrix * self.transform);
        self.paint_bounds = map_rect(self.transform, child_bounds);
    }

    fn paint(&self, context: &mut PaintContext<'_>) {
        context.canvas.save();
        context.canvas.concat(self.transform);
        self.children.paint_children(context);
        context.canvas.restore();
    }

    fn paint_bounds(&self) -> Rect {
        self.paint_bounds
    }

    fn unique_id(&self) -> u64 {
        self.children.unique_id()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/container.rs"]
mod tests;
