//! Testing utilities for code built on the engine.
//!
//! This module provides:
//! - Engine fixtures with a scope already installed
//! - Assertions over the current stack
//! - Test logging setup

mod assertions;
mod fixtures;

pub use assertions::{assert_current_is, assert_depth, assert_stack_empty};
pub use fixtures::{engine_with, init_test_logging, probed_engine};
