//! # DCI samples
//!
//! Use cases written against the `dci` engine:
//!
//! - [`money_transfer`]: transferring money between accounts, and paying a
//!   list of bills through nested transfers
//! - [`shortest_path`]: Dijkstra's algorithm where every visited intersection
//!   runs as its own context

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

use dci::engine::Engine;

pub mod money_transfer;
pub mod shortest_path;

/// Registers the entry method of every sample context that runs opaquely.
pub fn register_contexts(engine: &Engine) {
    engine.register_executable::<money_transfer::MoneyTransfer>();
    engine.register_executable::<money_transfer::PayBills>();
    engine.register_executable::<shortest_path::CalculateShortestPath>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dci::context::ScopeKind;
    use dci::testing::engine_with;

    #[test]
    fn test_register_contexts() {
        let engine = engine_with(ScopeKind::Shared);
        register_contexts(&engine);

        assert_eq!(engine.entries().len(), 3);
        assert!(engine
            .entries()
            .contains::<shortest_path::CalculateShortestPath>("execute"));
    }
}
