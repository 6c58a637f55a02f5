//! Entry-method dispatch for opaque contexts.
//!
//! When the engine is handed a context with no closure, it looks up the
//! context's concrete type in an [`EntryRegistry`] under the configured
//! entry-method name and invokes what it finds. Registration replaces
//! runtime method lookup by name.

mod registry;

pub use registry::{EntryRegistry, Executable};

/// The entry method name used until another one is configured.
pub const DEFAULT_ENTRY_METHOD: &str = "execute";
