//! The context-scoped execution engine.
//!
//! An [`Engine`] owns the initialization state (scope policy, entry method
//! name, dependency resolver) and the entry registry. Everything that needs
//! "the current context" receives the engine by reference.
//!
//! ```rust,ignore
//! let engine = Engine::new();
//! engine.install_per_thread()?;
//!
//! let transfer = Arc::new(Transfer::new(source, destination, 245));
//! engine.run(&transfer, |ctx| ctx.source.transfer(&engine))?;
//! ```

mod accessor;
mod config;
mod execute;
mod guard;
mod init;
mod resolve;

pub use config::EngineConfig;

use crate::context::{ContextStack, ScopePolicy};
use crate::dispatch::{EntryRegistry, DEFAULT_ENTRY_METHOD};
use crate::errors::DciError;
use crate::resolver::DependencyResolver;
use parking_lot::RwLock;
use std::sync::Arc;

/// Initialization state guarded by the engine.
struct EngineState {
    /// The installed scope policy.
    scope: Option<ScopePolicy>,
    /// Entry method name used for opaque contexts.
    entry_method: String,
    /// Optional dependency resolver.
    resolver: Option<Arc<dyn DependencyResolver>>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            scope: None,
            entry_method: DEFAULT_ENTRY_METHOD.to_string(),
            resolver: None,
        }
    }
}

/// Context-scoped execution engine.
#[derive(Default)]
pub struct Engine {
    state: RwLock<EngineState>,
    entries: EntryRegistry,
}

impl Engine {
    /// Creates an uninitialized engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry registry.
    #[must_use]
    pub fn entries(&self) -> &EntryRegistry {
        &self.entries
    }

    /// Resolves the stack backing the current call.
    ///
    /// The policy is cloned out before the stack is resolved, so a custom
    /// factory never runs under the state lock.
    pub(crate) fn active_stack(&self) -> Result<Arc<ContextStack>, DciError> {
        let scope = self.state.read().scope.clone();
        scope
            .map(|scope| scope.current_stack())
            .ok_or(DciError::NotInitialized)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(scope) = self.state.get_mut().scope.take() {
            scope.release();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Engine")
            .field("scope", &state.scope.as_ref().map(ScopePolicy::kind))
            .field("entry_method", &state.entry_method)
            .field("has_resolver", &state.resolver.is_some())
            .field("entries", &self.entries)
            .finish()
    }
}
