use crate::foundation::error::{FramepipeError, FramepipeResult};
use std::sync::Arc;

/// Immutable premultiplied RGBA8 image shared between caches, textures and canvases.
#[derive(Clone)]
pub struct RasterImage {
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RasterImage {
    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    /// Build an image from tightly packed premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(bytes: &[u8], width: u32, height: u32) -> FramepipeResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| FramepipeError::raster("image width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| FramepipeError::raster("image height exceeds u16"))?;
        if bytes.len()
            != (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(4)
        {
            return Err(FramepipeError::raster("image byte len mismatch"));
        }
        let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
            (width as usize) * (height as usize),
        );
        for px in bytes.chunks_exact(4) {
            pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
                px[0], px[1], px[2], px[3],
            ]));
        }
        Ok(Self::from_pixmap(vello_cpu::Pixmap::from_parts_with_opacity(
            pixels, w, h, true,
        )))
    }

    /// Build a single-color image.
    pub fn solid(width: u32, height: u32, rgba_premul: [u8; 4]) -> FramepipeResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        let bytes: Vec<u8> = std::iter::repeat_n(rgba_premul, n).flatten().collect();
        Self::from_premul_rgba8(&bytes, width, height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Approximate memory held by the pixels.
    pub fn byte_size(&self) -> usize {
        (self.width() as usize) * (self.height() as usize) * 4
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }

    /// Return `true` if both handles share the same pixel storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap)
    }
}
