//! Configuration types for building an engine.

use crate::context::ScopeKind;
use crate::dispatch::DEFAULT_ENTRY_METHOD;
use crate::errors::DciError;
use serde::{Deserialize, Serialize};

/// Configuration for [`Engine::from_config`](super::Engine::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which stack backs the current context.
    #[serde(default)]
    pub scope: ScopeKind,
    /// Entry method name for opaque contexts.
    #[serde(default = "default_entry_method")]
    pub entry_method: String,
}

fn default_entry_method() -> String {
    DEFAULT_ENTRY_METHOD.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scope: ScopeKind::default(),
            entry_method: default_entry_method(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scope kind.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the entry method name.
    #[must_use]
    pub fn with_entry_method(mut self, name: impl Into<String>) -> Self {
        self.entry_method = name.into();
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, DciError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DciError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), DciError> {
        if self.entry_method.trim().is_empty() {
            return Err(DciError::Config("entry method name must not be empty".to_string()));
        }
        Ok(())
    }
}
