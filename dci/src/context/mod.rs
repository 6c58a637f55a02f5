//! Context storage for in-flight executions.
//!
//! This module provides:
//! - Context frames carrying type-erased context values
//! - The LIFO stack of frames in flight
//! - Scope policies choosing which stack a call sees

mod frame;
mod scope;
mod stack;

pub use frame::{context_ref, ContextFrame, ContextRef, ContextValue};
pub use scope::{ScopeKind, ScopePolicy, StackFactory, ThreadScope};

#[cfg(test)]
pub(crate) use scope::thread_stack_count;
pub use stack::ContextStack;
