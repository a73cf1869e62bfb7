use crate::foundation::core::FrameSize;
use crate::paint::canvas::Canvas;
use crate::paint::display_list::{DisplayList, DisplayListBuilder};
use crate::paint::pixmap_canvas::{FrameRGBA, PixmapCanvas};
use crate::surface::GpuContext;
use std::sync::Arc;

/// Called once per successful submit with the frame being submitted.
pub type SubmitCallback = Box<dyn FnMut(&mut SurfaceFrame) -> bool>;

/// Capabilities of the framebuffer behind a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferInfo {
    /// Pixels can be read back after submit.
    pub supports_readback: bool,
    /// Only damaged regions need repainting.
    pub supports_partial_repaint: bool,
}

impl Default for FramebufferInfo {
    fn default() -> Self {
        Self {
            supports_readback: true,
            supports_partial_repaint: false,
        }
    }
}

/// The drawable target for exactly one frame.
///
/// Either a live pixmap canvas, or, in fallback mode, a display-list recording.
pub struct SurfaceFrame {
    canvas: Option<PixmapCanvas>,
    recorder: Option<DisplayListBuilder>,
    framebuffer_info: FramebufferInfo,
    frame_size: FrameSize,
    context: Option<GpuContext>,
    submit_callback: Option<SubmitCallback>,
    submitted: bool,
}

impl std::fmt::Debug for SurfaceFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceFrame")
            .field("live_canvas", &self.canvas.is_some())
            .field("recording", &self.recorder.is_some())
            .field("frame_size", &self.frame_size)
            .field("submitted", &self.submitted)
            .finish()
    }
}

impl SurfaceFrame {
    /// Wrap a frame target. With `display_list_fallback` set, a recorder is created and used
    /// whenever there is no live canvas.
    pub fn new(
        canvas: Option<PixmapCanvas>,
        framebuffer_info: FramebufferInfo,
        frame_size: FrameSize,
        context: Option<GpuContext>,
        submit_callback: Option<SubmitCallback>,
        display_list_fallback: bool,
    ) -> Self {
        Self {
            canvas,
            recorder: display_list_fallback.then(DisplayListBuilder::new),
            framebuffer_info,
            frame_size,
            context,
            submit_callback,
            submitted: false,
        }
    }

    /// The canvas to paint into: the live surface if present, else the recorder.
    pub fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        if let Some(canvas) = self.canvas.as_mut() {
            return Some(canvas as &mut dyn Canvas);
        }
        self.recorder.as_mut().map(|r| r as &mut dyn Canvas)
    }

    /// Hand the frame to the submit callback.
    ///
    /// Returns `false` without calling the callback when the frame was already submitted
    /// successfully, or when there is no callback. A failed submit may be retried.
    pub fn submit(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        let Some(mut callback) = self.submit_callback.take() else {
            tracing::warn!("surface frame has no submit callback");
            return false;
        };
        let ok = callback(self);
        self.submit_callback = Some(callback);
        self.submitted = ok;
        if !ok {
            tracing::warn!(frame_size = ?self.frame_size, "surface frame submit failed");
        }
        ok
    }

    /// Snapshot the recording made so far, or `None` outside fallback mode.
    pub fn build_display_list(&self) -> Option<Arc<DisplayList>> {
        self.recorder.as_ref().map(DisplayListBuilder::snapshot)
    }

    /// Flush the live canvas and copy its pixels out.
    pub fn snapshot(&mut self) -> Option<FrameRGBA> {
        self.canvas.as_mut().map(PixmapCanvas::snapshot)
    }

    /// Take ownership of the live canvas.
    pub fn take_pixmap(&mut self) -> Option<PixmapCanvas> {
        self.canvas.take()
    }

    /// Size the frame was acquired at.
    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Framebuffer capabilities.
    pub fn framebuffer_info(&self) -> FramebufferInfo {
        self.framebuffer_info
    }

    /// Context the frame draws with.
    pub fn context(&self) -> Option<&GpuContext> {
        self.context.as_ref()
    }

    /// Return `true` once a submit has succeeded.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/frame.rs"]
mod tests;
