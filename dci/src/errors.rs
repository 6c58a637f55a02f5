//! Error types for the dci engine.
//!
//! Only failures raised by the engine itself live here. A unit of work keeps
//! its own error type; the engine hands those failures back untouched.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DciError {
    /// No scope policy has been installed yet.
    #[error("Context is not initialized")]
    NotInitialized,

    /// A scope policy (or configuration) was set after initialization.
    #[error("Context has already been initialized")]
    AlreadyInitialized,

    /// The active stack has no context in flight.
    #[error("Context stack is empty")]
    EmptyStack,

    /// The top of the stack is not exactly the requested context type.
    #[error("Context type mismatch: expected {expected}, was {actual}")]
    ContextTypeMismatch {
        /// The requested context type.
        expected: &'static str,
        /// The type actually on top of the stack.
        actual: &'static str,
    },

    /// A role player is not the object bound into the context's slot.
    #[error("Role {role} is not bound to context {context}")]
    RoleBinding {
        /// The context type that was checked.
        context: &'static str,
        /// Description of the presented role.
        role: String,
    },

    /// An opaque context has no entry method under the configured name.
    #[error("No '{method}' entry method registered for context {context}")]
    NoExecutionMethod {
        /// The context type.
        context: &'static str,
        /// The configured entry method name.
        method: String,
    },

    /// An entry method exists but produces a different result or error type.
    #[error("Entry method '{method}' on {context} does not produce {expected}")]
    EntrySignatureMismatch {
        /// The context type.
        context: &'static str,
        /// The entry method name.
        method: String,
        /// The type the caller asked for.
        expected: &'static str,
    },

    /// Dependency resolution was requested without a resolver.
    #[error("No dependency resolver has been set")]
    ResolverNotSet,

    /// The resolver has nothing registered for a service.
    #[error("No service registered for {service}")]
    ServiceNotFound {
        /// The requested service type.
        service: String,
    },

    /// The resolver returned a value of the wrong type.
    #[error("Resolver returned a value that is not a {service}")]
    ServiceTypeMismatch {
        /// The requested service type.
        service: String,
    },

    /// Invalid engine configuration.
    #[error("Invalid engine configuration: {0}")]
    Config(String),
}

impl DciError {
    /// Creates a context type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::ContextTypeMismatch { expected, actual }
    }

    /// Creates a role binding error.
    #[must_use]
    pub fn role_binding(context: &'static str, role: impl Into<String>) -> Self {
        Self::RoleBinding {
            context,
            role: role.into(),
        }
    }

    /// Creates a missing entry method error.
    #[must_use]
    pub fn no_execution_method(context: &'static str, method: impl Into<String>) -> Self {
        Self::NoExecutionMethod {
            context,
            method: method.into(),
        }
    }

    /// Creates an entry signature mismatch error.
    #[must_use]
    pub fn entry_signature(
        context: &'static str,
        method: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::EntrySignatureMismatch {
            context,
            method: method.into(),
            expected,
        }
    }

    /// Creates a service not found error.
    #[must_use]
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Creates a service type mismatch error.
    #[must_use]
    pub fn service_type_mismatch(service: impl Into<String>) -> Self {
        Self::ServiceTypeMismatch {
            service: service.into(),
        }
    }

    /// Returns a stable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "DCI-001-NOT-INITIALIZED",
            Self::AlreadyInitialized => "DCI-002-ALREADY-INITIALIZED",
            Self::EmptyStack => "DCI-003-EMPTY-STACK",
            Self::ContextTypeMismatch { .. } => "DCI-004-TYPE-MISMATCH",
            Self::RoleBinding { .. } => "DCI-005-ROLE-BINDING",
            Self::NoExecutionMethod { .. } => "DCI-006-NO-EXECUTION-METHOD",
            Self::EntrySignatureMismatch { .. } => "DCI-007-ENTRY-SIGNATURE",
            Self::ResolverNotSet => "DCI-008-RESOLVER-NOT-SET",
            Self::ServiceNotFound { .. } => "DCI-009-SERVICE-NOT-FOUND",
            Self::ServiceTypeMismatch { .. } => "DCI-010-SERVICE-TYPE",
            Self::Config(_) => "DCI-011-CONFIG",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));

        match self {
            Self::ContextTypeMismatch { expected, actual } => {
                map.insert("expected".to_string(), serde_json::json!(expected));
                map.insert("actual".to_string(), serde_json::json!(actual));
            }
            Self::RoleBinding { context, role } => {
                map.insert("context".to_string(), serde_json::json!(context));
                map.insert("role".to_string(), serde_json::json!(role));
            }
            Self::NoExecutionMethod { context, method } => {
                map.insert("context".to_string(), serde_json::json!(context));
                map.insert("method".to_string(), serde_json::json!(method));
            }
            Self::EntrySignatureMismatch {
                context,
                method,
                expected,
            } => {
                map.insert("context".to_string(), serde_json::json!(context));
                map.insert("method".to_string(), serde_json::json!(method));
                map.insert("expected".to_string(), serde_json::json!(expected));
            }
            Self::ServiceNotFound { service } | Self::ServiceTypeMismatch { service } => {
                map.insert("service".to_string(), serde_json::json!(service));
            }
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::EmptyStack
            | Self::ResolverNotSet
            | Self::Config(_) => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}
