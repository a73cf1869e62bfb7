use crate::foundation::core::FrameSize;
use crate::paint::display_list::DisplayList;
use crate::surface::{FramebufferInfo, GpuContext, Surface, SurfaceFrame};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Recorded {
    last: Option<Arc<DisplayList>>,
    frames: u64,
}

/// Surface without pixels: every frame is recorded into a display list.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSurface {
    /// Create a recording surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording of the last submitted frame.
    pub fn last_recording(&self) -> Option<Arc<DisplayList>> {
        self.recorded.lock().last.clone()
    }

    /// Number of frames submitted.
    pub fn recorded_frames(&self) -> u64 {
        self.recorded.lock().frames
    }
}

impl Surface for RecordingSurface {
    fn acquire_frame(&mut self, size: FrameSize) -> Option<SurfaceFrame> {
        let recorded = Arc::clone(&self.recorded);
        Some(SurfaceFrame::new(
            None,
            FramebufferInfo {
                supports_readback: false,
                supports_partial_repaint: false,
            },
            size,
            None,
            Some(Box::new(move |frame: &mut SurfaceFrame| {
                let Some(list) = frame.build_display_list() else {
                    return false;
                };
                let mut recorded = recorded.lock();
                recorded.last = Some(list);
                recorded.frames += 1;
                true
            })),
            true,
        ))
    }

    fn gpu_context(&self) -> Option<GpuContext> {
        None
    }

    fn is_valid(&self) -> bool {
        true
    }
}
