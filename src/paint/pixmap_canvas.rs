use crate::foundation::core::{Affine, BezPath, Color, FrameSize, Point, Rect};
use crate::foundation::error::{FramepipeError, FramepipeResult};
use crate::paint::canvas::{Canvas, TransformStack};
use crate::paint::image::RasterImage;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied RGBA8 at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// CPU raster canvas backed by a `vello_cpu` render context and pixmap.
pub struct PixmapCanvas {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    transforms: TransformStack,
    opacity_depth: usize,
}

impl std::fmt::Debug for PixmapCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapCanvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("save_count", &self.transforms.depth())
            .finish()
    }
}

impl PixmapCanvas {
    /// Create a transparent canvas. Both dimensions must be in `1..=u16::MAX`.
    pub fn new(width: u32, height: u32) -> FramepipeResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| FramepipeError::raster(format!("canvas width exceeds u16: {width}")))?;
        let h: u16 = height.try_into().map_err(|_| {
            FramepipeError::raster(format!("canvas height exceeds u16: {height}"))
        })?;
        if w == 0 || h == 0 {
            return Err(FramepipeError::raster("canvas dimensions must be non-zero"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            transforms: TransformStack::default(),
            opacity_depth: 0,
        })
    }

    /// Create a canvas matching `size`.
    pub fn with_size(size: FrameSize) -> FramepipeResult<Self> {
        Self::new(size.width, size.height)
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(
            u32::from(self.pixmap.width()),
            u32::from(self.pixmap.height()),
        )
    }

    /// Rasterize all pending commands into the backing pixmap.
    pub fn flush(&mut self) {
        while self.opacity_depth > 0 {
            self.ctx.pop_layer();
            self.opacity_depth -= 1;
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }

    /// Flush and copy the pixels out.
    pub fn snapshot(&mut self) -> FrameRGBA {
        self.flush();
        FrameRGBA {
            width: u32::from(self.pixmap.width()),
            height: u32::from(self.pixmap.height()),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Flush and convert the canvas into a shareable image.
    pub fn into_image(mut self) -> RasterImage {
        self.flush();
        RasterImage::from_pixmap(self.pixmap)
    }

    fn apply_transform(&mut self, t: Affine) {
        self.ctx.set_transform(affine_to_cpu(t));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl Canvas for PixmapCanvas {
    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) {
        self.transforms.restore();
    }

    fn save_count(&self) -> usize {
        self.transforms.depth()
    }

    fn transform(&self) -> Affine {
        self.transforms.current()
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transforms.set(transform);
    }

    fn clear(&mut self, color: Color) {
        if self.opacity_depth == 0 {
            // Nothing recorded so far can show through a full clear.
            self.ctx.reset();
        }
        if color.a == 0 {
            return;
        }
        let (w, h) = (
            f64::from(self.pixmap.width()),
            f64::from(self.pixmap.height()),
        );
        self.apply_transform(Affine::IDENTITY);
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.apply_transform(self.transforms.current());
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.apply_transform(self.transforms.current());
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn draw_image(&mut self, image: &RasterImage, origin: Point) {
        let t = self.transforms.current() * Affine::translate(origin.to_vec2());
        self.apply_transform(t);
        self.ctx.set_paint(image.paint());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        ));
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
        self.opacity_depth += 1;
    }

    fn pop_opacity(&mut self) {
        if self.opacity_depth > 0 {
            self.ctx.pop_layer();
            self.opacity_depth -= 1;
        }
    }
}

fn to_cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/paint/pixmap_canvas.rs"]
mod tests;
