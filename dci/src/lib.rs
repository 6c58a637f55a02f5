//! # DCI
//!
//! A context-scoped execution engine for Data, Context and Interaction style
//! use cases.
//!
//! A context is a use-case object that binds domain objects into named roles.
//! While a context runs, it is the "current context" for everything invoked
//! beneath it, so role methods can reach their sibling roles without those
//! being passed around. The engine provides:
//!
//! - **Scoped execution**: push a context, run work, pop on every exit path
//! - **Stack storage policies**: shared, per-thread or caller-supplied
//! - **Typed access**: retrieve the current context by exact type, with an
//!   optional role-binding identity check
//! - **Opaque dispatch**: run a type-erased context through a registered
//!   entry method
//! - **Dependency resolution**: delegate service lookups to a pluggable
//!   resolver
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dci::prelude::*;
//!
//! let engine = Engine::new();
//! engine.install_per_thread()?;
//!
//! let transfer = Arc::new(MoneyTransfer::new(source, destination, 245));
//! engine.run(&transfer, |ctx| ctx.source.transfer_out(&engine))?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod resolver;
pub mod role;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        context_ref, ContextFrame, ContextRef, ContextStack, ContextValue, ScopeKind,
        ScopePolicy,
    };
    pub use crate::dispatch::{EntryRegistry, Executable, DEFAULT_ENTRY_METHOD};
    pub use crate::engine::{Engine, EngineConfig};
    pub use crate::errors::DciError;
    pub use crate::resolver::{DependencyResolver, ServiceRef, ServiceRegistry};
    pub use crate::role::{Role, RoleIdentity};
}
