use crate::foundation::core::{Affine, Point, Rect};
use crate::paint::canvas::Canvas;
use crate::paint::image::RasterImage;
use crate::texture::{ContextListener, Texture};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct ImageTextureState {
    pending: Option<RasterImage>,
    current: Option<RasterImage>,
    new_frame_available: bool,
    context_alive: bool,
    unregistered: bool,
}

/// Texture whose frames are pushed as [`RasterImage`]s by a producer.
///
/// A pushed frame becomes visible on the next unfrozen paint. Images are dropped when the GPU
/// context is destroyed or the texture is unregistered.
#[derive(Debug)]
pub struct ImageTexture {
    id: i64,
    state: Mutex<ImageTextureState>,
}

impl ImageTexture {
    /// Create an empty texture with registry id `id`.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            state: Mutex::new(ImageTextureState {
                context_alive: true,
                ..ImageTextureState::default()
            }),
        }
    }

    /// Hand a new frame to the texture. Ignored once unregistered.
    pub fn push_frame(&self, image: RasterImage) {
        let mut state = self.state.lock();
        if state.unregistered {
            return;
        }
        state.pending = Some(image);
        state.new_frame_available = true;
    }

    /// The image the next paint would show with `freeze` set.
    pub fn current_image(&self) -> Option<RasterImage> {
        self.state.lock().current.clone()
    }

    /// Return `true` if a frame is waiting to be latched.
    pub fn has_new_frame(&self) -> bool {
        self.state.lock().new_frame_available
    }

    /// Return `true` while the GPU context is alive.
    pub fn context_alive(&self) -> bool {
        self.state.lock().context_alive
    }

    /// Return `true` once the registry has dropped this texture.
    pub fn is_unregistered(&self) -> bool {
        self.state.lock().unregistered
    }
}

impl ContextListener for ImageTexture {
    fn on_gr_context_created(&self) {
        self.state.lock().context_alive = true;
    }

    fn on_gr_context_destroyed(&self) {
        let mut state = self.state.lock();
        state.context_alive = false;
        state.current = None;
        state.pending = None;
        state.new_frame_available = false;
    }
}

impl Texture for ImageTexture {
    fn id(&self) -> i64 {
        self.id
    }

    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect, freeze: bool) {
        let image = {
            let mut state = self.state.lock();
            if !freeze && state.new_frame_available {
                state.new_frame_available = false;
                if let Some(next) = state.pending.take() {
                    state.current = Some(next);
                }
            }
            state.current.clone()
        };
        let Some(image) = image else {
            return;
        };
        if image.width() == 0 || image.height() == 0 || bounds.is_zero_area() {
            return;
        }

        let sx = bounds.width() / f64::from(image.width());
        let sy = bounds.height() / f64::from(image.height());
        canvas.save();
        canvas.concat(Affine::translate((bounds.x0, bounds.y0)) * Affine::scale_non_uniform(sx, sy));
        canvas.draw_image(&image, Point::ZERO);
        canvas.restore();
    }

    fn mark_new_frame_available(&self) {
        self.state.lock().new_frame_available = true;
    }

    fn on_texture_unregistered(&self) {
        let mut state = self.state.lock();
        state.unregistered = true;
        state.current = None;
        state.pending = None;
        state.new_frame_available = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/image_texture.rs"]
mod tests;
