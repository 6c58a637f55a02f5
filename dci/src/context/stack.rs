//! LIFO stack of in-flight execution contexts.

use super::ContextFrame;
use crate::errors::DciError;
use parking_lot::Mutex;

/// An ordered, last-in-first-out sequence of context frames.
///
/// Each push, pop and peek is atomic on its own. Nothing serializes whole
/// executions: two threads sharing one stack interleave their frames.
#[derive(Default)]
pub struct ContextStack {
    frames: Mutex<Vec<ContextFrame>>,
}

impl ContextStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack pre-seeded with frames, bottom first.
    #[must_use]
    pub fn with_frames(frames: impl IntoIterator<Item = ContextFrame>) -> Self {
        Self {
            frames: Mutex::new(frames.into_iter().collect()),
        }
    }

    /// Pushes a frame and returns the new depth.
    pub fn push(&self, frame: ContextFrame) -> usize {
        let mut frames = self.frames.lock();
        frames.push(frame);
        frames.len()
    }

    /// Pops the top frame.
    pub fn pop(&self) -> Option<ContextFrame> {
        self.frames.lock().pop()
    }

    /// Returns the top frame without removing it.
    pub fn peek(&self) -> Result<ContextFrame, DciError> {
        self.frames.lock().last().cloned().ok_or(DciError::EmptyStack)
    }

    /// Returns the number of frames in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns true if no frame is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Returns the context type names, bottom first.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        self.frames.lock().iter().map(ContextFrame::type_name).collect()
    }
}

impl std::fmt::Debug for ContextStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStack")
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_stack_is_empty() {
        let stack = ContextStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_peek_on_empty_stack_fails() {
        let stack = ContextStack::new();
        assert_eq!(stack.peek().unwrap_err(), DciError::EmptyStack);
    }

    #[test]
    fn test_push_pop_is_lifo() {
        let stack = ContextStack::new();
        assert_eq!(stack.push(ContextFrame::of(Arc::new(1_u32))), 1);
        assert_eq!(stack.push(ContextFrame::of(Arc::new("second"))), 2);

        assert!(stack.peek().unwrap().is::<&str>());
        assert!(stack.pop().unwrap().is::<&str>());
        assert!(stack.pop().unwrap().is::<u32>());
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let stack = ContextStack::new();
        stack.push(ContextFrame::of(Arc::new(7_i64)));

        stack.peek().unwrap();
        stack.peek().unwrap();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_with_frames_seeds_bottom_first() {
        let stack = ContextStack::with_frames([
            ContextFrame::of(Arc::new(1_u8)),
            ContextFrame::of(Arc::new(String::from("Mock"))),
        ]);

        assert_eq!(stack.depth(), 2);
        let top = stack.peek().unwrap().downcast::<String>().unwrap();
        assert_eq!(top.as_str(), "Mock");
        let names = stack.type_names();
        assert_eq!(names[0], "u8");
        assert!(names[1].ends_with("String"));
    }
}
