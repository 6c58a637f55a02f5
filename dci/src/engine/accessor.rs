//! Read-only access to the current context.

use super::Engine;
use crate::context::ContextFrame;
use crate::errors::DciError;
use crate::role::RoleIdentity;
use std::any::{type_name, Any};
use std::sync::Arc;
use tracing::trace;

impl Engine {
    /// Returns the current context if it is exactly of type `T`.
    ///
    /// There is no widening: a wrapper around `T`, or a type that derefs to
    /// `T`, is a [`DciError::ContextTypeMismatch`].
    pub fn current<T: Any + Send + Sync>(&self) -> Result<Arc<T>, DciError> {
        let frame = self.current_frame()?;
        frame
            .downcast::<T>()
            .ok_or_else(|| DciError::type_mismatch(type_name::<T>(), frame.type_name()))
    }

    /// Returns the current context of type `T`, verifying that `role` is the
    /// player bound into the slot picked by `selector`.
    ///
    /// ```rust,ignore
    /// let ctx = engine.current_bound::<Transfer, _, _>(self, |c| &c.source)?;
    /// ```
    pub fn current_bound<T, R, F>(&self, role: &R, selector: F) -> Result<Arc<T>, DciError>
    where
        T: Any + Send + Sync,
        R: RoleIdentity + ?Sized,
        F: FnOnce(&T) -> &R,
    {
        let context = self.current::<T>()?;
        if !role.same_player(selector(&*context)) {
            trace!(context = type_name::<T>(), role = %role.describe(), "Role binding check failed");
            return Err(DciError::role_binding(type_name::<T>(), role.describe()));
        }
        Ok(context)
    }

    /// Returns the top frame of the current stack.
    pub fn current_frame(&self) -> Result<ContextFrame, DciError> {
        self.active_stack()?.peek()
    }

    /// Returns the number of executions in flight on the current stack.
    pub fn depth(&self) -> Result<usize, DciError> {
        Ok(self.active_stack()?.depth())
    }
}
