//! External textures and GPU-context lifecycle fan-out.

use crate::foundation::core::{Rect, next_unique_id};
use crate::paint::canvas::Canvas;

/// Image-backed texture fed by a producer thread.
pub mod image_texture;
/// Process-wide texture and listener directory.
pub mod registry;

pub use image_texture::ImageTexture;
pub use registry::TextureRegistry;

/// Receives GPU-context creation and destruction.
pub trait ContextListener: Send + Sync {
    /// A GPU context became available.
    fn on_gr_context_created(&self);
    /// The GPU context is going away; release anything that lives on it.
    fn on_gr_context_destroyed(&self);
}

/// Externally supplied texture (video frames, platform views, ...).
pub trait Texture: ContextListener {
    /// Registry id of this texture.
    fn id(&self) -> i64;

    /// Paint the current content into `bounds`. When `freeze` is set, keep showing the
    /// previously painted frame.
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect, freeze: bool);

    /// The producer has a new frame ready.
    fn mark_new_frame_available(&self);

    /// Called once when the texture is removed from the registry.
    fn on_texture_unregistered(&self);
}

/// Opaque identity of a registered [`ContextListener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Allocate a fresh process-unique listener id.
    pub fn unique() -> Self {
        Self(next_unique_id())
    }
}
