//! Scoped frame release.

use crate::context::{ContextFrame, ContextStack};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Pops its frame when dropped, whether the work returned, failed, or
/// unwound.
pub(crate) struct FrameGuard {
    stack: Arc<ContextStack>,
    frame_id: Uuid,
    context: &'static str,
}

impl FrameGuard {
    /// Pushes `frame` onto `stack` and returns the guard owning the pop.
    pub(crate) fn enter(stack: Arc<ContextStack>, frame: ContextFrame) -> Self {
        let frame_id = frame.id();
        let context = frame.type_name();
        let depth = stack.push(frame);
        debug!(frame_id = %frame_id, context, depth, "Context pushed");

        Self {
            stack,
            frame_id,
            context,
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let popped = self.stack.pop();
        let depth = self.stack.depth();
        match popped {
            Some(frame) if frame.id() == self.frame_id => {
                debug!(frame_id = %self.frame_id, context = self.context, depth, "Context popped");
            }
            // Another thread pushed on top of us through a shared stack.
            Some(frame) => {
                warn!(
                    frame_id = %self.frame_id,
                    context = self.context,
                    popped_frame_id = %frame.id(),
                    popped_context = frame.type_name(),
                    depth,
                    "Popped a frame pushed by an interleaved execution"
                );
            }
            None => {
                warn!(
                    frame_id = %self.frame_id,
                    context = self.context,
                    "Context stack was already empty on release"
                );
            }
        }
    }
}
