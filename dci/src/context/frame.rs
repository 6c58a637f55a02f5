//! Context values and the frames that carry them on a stack.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Any value that can be pushed as an execution context.
///
/// Implemented for every `'static + Send + Sync` type; it only exists so a
/// type-erased context still knows its concrete type name.
pub trait ContextValue: Any + Send + Sync {
    /// Returns the concrete type name of the context.
    fn type_name(&self) -> &'static str;

    /// Borrows the context as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Converts a shared context into a shared [`Any`] for downcasting.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> ContextValue for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Opaque shared reference to an application-defined context value.
pub type ContextRef = Arc<dyn ContextValue>;

/// Wraps a typed context into a [`ContextRef`].
#[must_use]
pub fn context_ref<C: Any + Send + Sync>(context: Arc<C>) -> ContextRef {
    context
}

/// One entry of a [`ContextStack`](super::ContextStack).
#[derive(Clone)]
pub struct ContextFrame {
    id: Uuid,
    type_name: &'static str,
    value: ContextRef,
}

impl ContextFrame {
    /// Creates a frame for a context value.
    #[must_use]
    pub fn new(value: ContextRef) -> Self {
        let type_name = ContextValue::type_name(&*value);
        Self {
            id: Uuid::now_v7(),
            type_name,
            value,
        }
    }

    /// Creates a frame from a typed context.
    #[must_use]
    pub fn of<C: Any + Send + Sync>(value: Arc<C>) -> Self {
        Self::new(value)
    }

    /// Returns the frame id used for log correlation.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the concrete type name of the context.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the context value.
    #[must_use]
    pub fn value(&self) -> &ContextRef {
        &self.value
    }

    /// Returns true if the context is exactly of type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        ContextValue::as_any(&*self.value).is::<T>()
    }

    /// Downcasts the context to exactly `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        ContextValue::into_any(Arc::clone(&self.value))
            .downcast::<T>()
            .ok()
    }
}

impl fmt::Debug for ContextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFrame")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
