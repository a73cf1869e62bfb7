//! Drawable targets for one frame and the surfaces that hand them out.

use crate::foundation::core::{Affine, FrameSize, next_unique_id};
use std::sync::Arc;

/// Per-frame drawable target and its submit guard.
pub mod frame;
/// Display-list-only surface for headless runs.
pub mod recording;
/// CPU pixmap surface.
pub mod software;

pub use frame::{FramebufferInfo, SubmitCallback, SurfaceFrame};
pub use recording::RecordingSurface;
pub use software::{PresentedFrames, SoftwareSurface, SoftwareSurfaceDelegate};

#[derive(Debug)]
struct GpuContextInner {
    id: u64,
    label: String,
}

/// Opaque handle to the rendering context surfaces draw with.
///
/// Cheap to clone; clones compare equal.
#[derive(Clone, Debug)]
pub struct GpuContext {
    inner: Arc<GpuContextInner>,
}

impl GpuContext {
    /// Create a new context handle.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(GpuContextInner {
                id: next_unique_id(),
                label: label.into(),
            }),
        }
    }

    /// Process-unique id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Human-readable name.
    pub fn label(&self) -> &str {
        &self.inner.label
    }
}

impl PartialEq for GpuContext {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for GpuContext {}

/// Source of [`SurfaceFrame`]s for the rasterizer.
pub trait Surface: Send {
    /// Acquire a frame of `size`, or `None` when the surface cannot produce one.
    fn acquire_frame(&mut self, size: FrameSize) -> Option<SurfaceFrame>;

    /// Context frames from this surface draw with.
    fn gpu_context(&self) -> Option<GpuContext>;

    /// Transform applied at the root of every frame (e.g. device pixel ratio).
    fn root_transformation(&self) -> Affine {
        Affine::IDENTITY
    }

    /// Return `true` while the surface can produce frames.
    fn is_valid(&self) -> bool;
}
