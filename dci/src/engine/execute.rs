//! Execution surface: push a context, run work, pop on every exit path.

use super::guard::FrameGuard;
use super::Engine;
use crate::context::{ContextFrame, ContextRef, ContextValue};
use crate::errors::DciError;
use std::any::Any;
use std::sync::Arc;

impl Engine {
    /// Runs `work` with `owner` as the current context.
    ///
    /// `owner` plays the part of the receiver the work is closing over; it is
    /// pushed as the marker and handed to `work`. Failures from `work` are
    /// returned unchanged.
    pub fn run<C, T, E, F>(&self, owner: &Arc<C>, work: F) -> Result<T, E>
    where
        C: Any + Send + Sync,
        E: From<DciError>,
        F: FnOnce(&C) -> Result<T, E>,
    {
        let context: ContextRef = Arc::clone(owner) as ContextRef;
        self.run_in(context, || work(owner))
    }

    /// Same as [`Engine::run`] for work without a return value.
    pub fn run_void<C, E, F>(&self, owner: &Arc<C>, work: F) -> Result<(), E>
    where
        C: Any + Send + Sync,
        E: From<DciError>,
        F: FnOnce(&C) -> Result<(), E>,
    {
        self.run(owner, work)
    }

    /// Runs `work` with an explicitly supplied context marker.
    ///
    /// Fails with [`DciError::NotInitialized`] before pushing if no scope is
    /// installed.
    pub fn run_in<T, E, F>(&self, context: ContextRef, work: F) -> Result<T, E>
    where
        E: From<DciError>,
        F: FnOnce() -> Result<T, E>,
    {
        let stack = self.active_stack()?;
        let _guard = FrameGuard::enter(stack, ContextFrame::new(context));
        work()
    }

    /// Same as [`Engine::run_in`] for work without a return value.
    pub fn run_in_void<E, F>(&self, context: ContextRef, work: F) -> Result<(), E>
    where
        E: From<DciError>,
        F: FnOnce() -> Result<(), E>,
    {
        self.run_in(context, work)
    }

    /// Runs an opaque context through its registered entry method.
    ///
    /// The entry is looked up under the configured entry method name for the
    /// context's concrete type, before anything is pushed. The context itself
    /// is the pushed marker.
    pub fn run_opaque<R, E>(&self, context: ContextRef) -> Result<R, E>
    where
        R: Any,
        E: From<DciError> + Any,
    {
        let stack = self.active_stack()?;
        let method = self.entry_method_name();
        let entry = self.entries.lookup(&*context, &method)?;
        entry.check_signature::<R, E>()?;

        let _guard = FrameGuard::enter(stack, ContextFrame::new(Arc::clone(&context)));
        entry.invoke::<R, E>(ContextValue::as_any(&*context), self)
    }

    /// Same as [`Engine::run_opaque`] for entries without a return value.
    pub fn run_opaque_void<E>(&self, context: ContextRef) -> Result<(), E>
    where
        E: From<DciError> + Any,
    {
        self.run_opaque::<(), E>(context)
    }
}
