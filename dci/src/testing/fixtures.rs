//! Engine fixtures for tests.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::context::{ContextStack, ScopeKind, ScopePolicy};
use crate::engine::Engine;

/// Initializes tracing output for tests if not already done.
///
/// Honors `RUST_LOG`, defaulting to `debug` for this crate.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dci=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an engine with the given scope installed.
///
/// A [`ScopeKind::Custom`] engine gets a fresh stack shared by every caller.
#[must_use]
pub fn engine_with(scope: ScopeKind) -> Engine {
    let engine = Engine::new();
    let policy = match scope {
        ScopeKind::Shared => ScopePolicy::shared(),
        ScopeKind::PerThread => ScopePolicy::per_thread(),
        ScopeKind::Custom => ScopePolicy::with_stack(Arc::new(ContextStack::new())),
    };
    engine.install(policy).expect("fresh engine");
    engine
}

/// Creates an engine whose stack is handed back for inspection.
#[must_use]
pub fn probed_engine() -> (Engine, Arc<ContextStack>) {
    let stack = Arc::new(ContextStack::new());
    let engine = Engine::new();
    engine
        .install(ScopePolicy::with_stack(Arc::clone(&stack)))
        .expect("fresh engine");
    (engine, stack)
}
