pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique, never-reused id for display lists and layers.
pub(crate) fn next_unique_id() -> u64 {
    NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgba8(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgba8(255, 255, 255, 255);

    /// Build a color from straight-alpha channels.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Return the color with its alpha scaled by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: ((f32::from(self.a) * o) + 0.5) as u8,
            ..self
        }
    }

    /// Premultiplied RGBA8 bytes.
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        let a16 = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

/// Integer size of a frame or surface in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Construct a frame size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` if either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The frame as a rect anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Round a rect outward to integer pixel edges.
pub fn round_out(rect: Rect) -> Rect {
    Rect::new(
        rect.x0.floor(),
        rect.y0.floor(),
        rect.x1.ceil(),
        rect.y1.ceil(),
    )
}

/// Map `rect` through `m` and return the axis-aligned bounds of the result.
pub fn map_rect(m: Affine, rect: Rect) -> Rect {
    m.transform_rect_bbox(rect)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
