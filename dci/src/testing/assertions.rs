//! Test assertions over the current stack.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::engine::Engine;

/// Asserts that the current stack holds exactly `expected` frames.
pub fn assert_depth(engine: &Engine, expected: usize) {
    let actual = engine.depth().expect("engine is not initialized");
    assert_eq!(
        actual, expected,
        "Expected stack depth {expected}, got {actual}"
    );
}

/// Asserts that no execution is in flight on the current stack.
pub fn assert_stack_empty(engine: &Engine) {
    assert_depth(engine, 0);
}

/// Asserts that the current context is exactly `expected`.
pub fn assert_current_is<T: Any + Send + Sync>(engine: &Engine, expected: &Arc<T>) {
    match engine.current::<T>() {
        Ok(current) => assert!(
            Arc::ptr_eq(&current, expected),
            "Current context is a {} but not the expected instance",
            type_name::<T>()
        ),
        Err(err) => panic!("Expected current context {}, got error: {err}", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScopeKind;
    use crate::errors::DciError;
    use crate::testing::engine_with;

    #[test]
    fn test_assert_current_is_inside_run() {
        let engine = engine_with(ScopeKind::PerThread);
        let owner = Arc::new(String::from("owner"));

        engine
            .run_void(&owner, |_| -> Result<(), DciError> {
                assert_current_is(&engine, &owner);
                assert_depth(&engine, 1);
                Ok(())
            })
            .unwrap();
        assert_stack_empty(&engine);
    }

    #[test]
    #[should_panic(expected = "not the expected instance")]
    fn test_assert_current_is_rejects_other_instance() {
        let engine = engine_with(ScopeKind::PerThread);
        let owner = Arc::new(String::from("owner"));
        let other = Arc::new(String::from("owner"));

        let _ = engine.run_void(&owner, |_| -> Result<(), DciError> {
            assert_current_is(&engine, &other);
            Ok(())
        });
    }
}
