//! Initialization surface: scope installation and one-time configuration.

use super::{Engine, EngineConfig, EngineState};
use crate::context::{ContextStack, ScopeKind, ScopePolicy};
use crate::dispatch::Executable;
use crate::errors::DciError;
use crate::resolver::DependencyResolver;
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

impl Engine {
    /// Creates an engine from configuration and installs its scope.
    ///
    /// A custom scope needs a stack factory and cannot come from config.
    pub fn from_config(config: &EngineConfig) -> Result<Self, DciError> {
        config.validate()?;

        let engine = Self::new();
        engine.set_entry_method_name(config.entry_method.clone())?;
        match config.scope {
            ScopeKind::Shared => engine.install_shared()?,
            ScopeKind::PerThread => engine.install_per_thread()?,
            ScopeKind::Custom => {
                return Err(DciError::Config(
                    "custom scope requires a stack factory; use install_custom".to_string(),
                ))
            }
        }
        Ok(engine)
    }

    /// Installs a scope policy.
    ///
    /// Fails with [`DciError::AlreadyInitialized`] if one is installed; the
    /// existing state is left untouched.
    pub fn install(&self, policy: ScopePolicy) -> Result<(), DciError> {
        let mut state = self.state.write();
        if let Some(existing) = &state.scope {
            warn!(
                installed = %existing.kind(),
                requested = %policy.kind(),
                "Rejected scope installation: engine already initialized"
            );
            return Err(DciError::AlreadyInitialized);
        }

        info!(
            scope = %policy.kind(),
            entry_method = %state.entry_method,
            "Context engine initialized"
        );
        state.scope = Some(policy);
        Ok(())
    }

    /// Installs one stack shared by every thread.
    pub fn install_shared(&self) -> Result<(), DciError> {
        self.install(ScopePolicy::shared())
    }

    /// Installs one stack per thread.
    pub fn install_per_thread(&self) -> Result<(), DciError> {
        self.install(ScopePolicy::per_thread())
    }

    /// Installs a caller-supplied stack factory.
    pub fn install_custom<F>(&self, factory: F) -> Result<(), DciError>
    where
        F: Fn() -> Arc<ContextStack> + Send + Sync + 'static,
    {
        self.install(ScopePolicy::custom(factory))
    }

    /// Sets the entry method name used by `run_opaque`.
    ///
    /// Must be called before a scope is installed.
    pub fn set_entry_method_name(&self, name: impl Into<String>) -> Result<(), DciError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DciError::Config("entry method name must not be empty".to_string()));
        }

        let mut state = self.state.write();
        reject_if_initialized(&state, "entry method name")?;
        state.entry_method = name;
        Ok(())
    }

    /// Sets the dependency resolver.
    ///
    /// Must be called before a scope is installed.
    pub fn set_dependency_resolver(
        &self,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Result<(), DciError> {
        let mut state = self.state.write();
        reject_if_initialized(&state, "dependency resolver")?;
        state.resolver = Some(resolver);
        Ok(())
    }

    /// Resets scope, entry method name and resolver to their defaults.
    ///
    /// Registered entries are kept. The calling thread's per-thread stack is
    /// dropped; a later install always starts from empty stacks.
    pub fn clear(&self) {
        let mut state = self.state.write();
        if let Some(scope) = state.scope.take() {
            scope.release();
        }
        *state = EngineState::default();
        info!("Context engine cleared");
    }

    /// Returns true if a scope policy is installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().scope.is_some()
    }

    /// Returns the installed scope kind.
    #[must_use]
    pub fn scope_kind(&self) -> Option<ScopeKind> {
        self.state.read().scope.as_ref().map(ScopePolicy::kind)
    }

    /// Returns the configured entry method name.
    #[must_use]
    pub fn entry_method_name(&self) -> String {
        self.state.read().entry_method.clone()
    }

    /// Registers an entry method for contexts of type `C`.
    pub fn register_entry<C, R, E, F>(&self, method: impl Into<String>, entry: F)
    where
        C: Any + Send + Sync,
        R: Any + Send,
        E: Any + Send,
        F: Fn(&C, &Engine) -> Result<R, E> + Send + Sync + 'static,
    {
        self.entries.register(method, entry);
    }

    /// Registers an [`Executable`] context under the default entry method.
    pub fn register_executable<C: Executable>(&self) {
        self.entries.register_executable::<C>();
    }
}

fn reject_if_initialized(state: &EngineState, what: &str) -> Result<(), DciError> {
    if let Some(scope) = &state.scope {
        warn!(installed = %scope.kind(), "Rejected {what} change: engine already initialized");
        return Err(DciError::AlreadyInitialized);
    }
    Ok(())
}
