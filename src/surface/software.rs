use crate::foundation::core::{Affine, FrameSize};
use crate::paint::pixmap_canvas::{FrameRGBA, PixmapCanvas};
use crate::surface::{FramebufferInfo, GpuContext, Surface, SurfaceFrame};
use parking_lot::Mutex;
use std::sync::Arc;

/// Receives finished software frames.
pub trait SoftwareSurfaceDelegate: Send + Sync {
    /// Present `frame`; return `false` if it could not be shown.
    fn present(&self, frame: FrameRGBA) -> bool;
}

/// Delegate that keeps the most recent presented frames in memory.
#[derive(Clone, Debug)]
pub struct PresentedFrames {
    frames: Arc<Mutex<Vec<FrameRGBA>>>,
    keep: usize,
}

impl Default for PresentedFrames {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PresentedFrames {
    /// Keep at most `keep` frames (at least one).
    pub fn new(keep: usize) -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            keep: keep.max(1),
        }
    }

    /// Most recently presented frame.
    pub fn last(&self) -> Option<FrameRGBA> {
        self.frames.lock().last().cloned()
    }

    /// Number of retained frames.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Return `true` if nothing has been presented.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Remove and return the retained frames, oldest first.
    pub fn take_all(&self) -> Vec<FrameRGBA> {
        std::mem::take(&mut *self.frames.lock())
    }
}

impl SoftwareSurfaceDelegate for PresentedFrames {
    fn present(&self, frame: FrameRGBA) -> bool {
        let mut frames = self.frames.lock();
        if frames.len() == self.keep {
            frames.remove(0);
        }
        frames.push(frame);
        true
    }
}

/// Surface that rasterizes frames on the CPU and hands the pixels to a delegate.
pub struct SoftwareSurface {
    delegate: Arc<dyn SoftwareSurfaceDelegate>,
    context: GpuContext,
    root_transformation: Affine,
}

impl std::fmt::Debug for SoftwareSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareSurface")
            .field("context", &self.context)
            .field("root_transformation", &self.root_transformation)
            .finish()
    }
}

impl SoftwareSurface {
    /// Create a surface presenting to `delegate`.
    pub fn new(delegate: Arc<dyn SoftwareSurfaceDelegate>) -> Self {
        Self {
            delegate,
            context: GpuContext::new("software"),
            root_transformation: Affine::IDENTITY,
        }
    }

    /// Apply `transform` at the root of every frame.
    pub fn with_root_transformation(mut self, transform: Affine) -> Self {
        self.root_transformation = transform;
        self
    }
}

impl Surface for SoftwareSurface {
    fn acquire_frame(&mut self, size: FrameSize) -> Option<SurfaceFrame> {
        let canvas = match PixmapCanvas::with_size(size) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(?size, error = %e, "software surface could not allocate frame");
                return None;
            }
        };
        let delegate = Arc::clone(&self.delegate);
        Some(SurfaceFrame::new(
            Some(canvas),
            FramebufferInfo::default(),
            size,
            Some(self.context.clone()),
            Some(Box::new(move |frame: &mut SurfaceFrame| {
                frame.snapshot().is_some_and(|rgba| delegate.present(rgba))
            })),
            false,
        ))
    }

    fn gpu_context(&self) -> Option<GpuContext> {
        Some(self.context.clone())
    }

    fn root_transformation(&self) -> Affine {
        self.root_transformation
    }

    fn is_valid(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/software.rs"]
mod tests;
