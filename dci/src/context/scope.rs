//! Storage policies deciding which stack backs "the current context".

use super::ContextStack;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Supplier of the stack to use for a call under a custom policy.
pub type StackFactory = Arc<dyn Fn() -> Arc<ContextStack> + Send + Sync>;

/// The kind of an installed scope policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// One stack shared by every thread.
    Shared,
    /// One stack per thread, created on first use.
    #[default]
    PerThread,
    /// A caller-supplied stack.
    Custom,
}

impl ScopeKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::PerThread => "per_thread",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Installation handle of a per-thread policy.
///
/// Thread-local stacks hold their handle weakly and are pruned once every
/// clone of the policy is gone.
#[derive(Debug)]
pub struct ThreadScope {
    id: u64,
}

impl ThreadScope {
    /// Returns the installation id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct ThreadEntry {
    owner: Weak<ThreadScope>,
    stack: Arc<ContextStack>,
}

thread_local! {
    /// Per-thread stacks, keyed by the id of the installation that owns them.
    static THREAD_STACKS: RefCell<HashMap<u64, ThreadEntry>> = RefCell::new(HashMap::new());
}

/// A storage strategy resolving to "the stack to use right now".
#[derive(Clone)]
pub enum ScopePolicy {
    /// The same stack is returned regardless of the calling thread.
    Shared(Arc<ContextStack>),
    /// Each thread gets its own stack for this installation.
    PerThread(Arc<ThreadScope>),
    /// The stack comes from a caller-supplied factory.
    Custom(StackFactory),
}

impl ScopePolicy {
    /// Creates a shared policy with a fresh stack.
    #[must_use]
    pub fn shared() -> Self {
        Self::Shared(Arc::new(ContextStack::new()))
    }

    /// Creates a per-thread policy with a fresh installation id.
    #[must_use]
    pub fn per_thread() -> Self {
        Self::PerThread(Arc::new(ThreadScope {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
        }))
    }

    /// Creates a custom policy from a stack factory.
    #[must_use]
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<ContextStack> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(factory))
    }

    /// Creates a custom policy that always returns the given stack.
    #[must_use]
    pub fn with_stack(stack: Arc<ContextStack>) -> Self {
        Self::custom(move || Arc::clone(&stack))
    }

    /// Returns the policy kind.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Shared(_) => ScopeKind::Shared,
            Self::PerThread(_) => ScopeKind::PerThread,
            Self::Custom(_) => ScopeKind::Custom,
        }
    }

    /// Resolves the stack for the calling thread.
    #[must_use]
    pub fn current_stack(&self) -> Arc<ContextStack> {
        match self {
            Self::Shared(stack) => Arc::clone(stack),
            Self::PerThread(scope) => thread_stack(scope),
            Self::Custom(factory) => factory(),
        }
    }

    /// Drops the calling thread's stack for a per-thread policy.
    ///
    /// Stacks created by other threads are pruned the next time those
    /// threads create a stack, or when they exit.
    pub(crate) fn release(&self) {
        if let Self::PerThread(scope) = self {
            // The map is gone if this runs during thread teardown.
            let _ = THREAD_STACKS.try_with(|stacks| {
                stacks.borrow_mut().remove(&scope.id);
            });
        }
    }
}

fn thread_stack(scope: &Arc<ThreadScope>) -> Arc<ContextStack> {
    THREAD_STACKS.with(|stacks| {
        let mut stacks = stacks.borrow_mut();
        if let Some(entry) = stacks.get(&scope.id) {
            return Arc::clone(&entry.stack);
        }

        stacks.retain(|_, entry| entry.owner.strong_count() > 0);
        let stack = Arc::new(ContextStack::new());
        stacks.insert(
            scope.id,
            ThreadEntry {
                owner: Arc::downgrade(scope),
                stack: Arc::clone(&stack),
            },
        );
        stack
    })
}

/// Number of per-thread stacks held by the calling thread.
#[cfg(test)]
pub(crate) fn thread_stack_count() -> usize {
    THREAD_STACKS.with(|stacks| stacks.borrow().len())
}

impl fmt::Debug for ScopePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared(stack) => f.debug_tuple("Shared").field(stack).finish(),
            Self::PerThread(scope) => f.debug_tuple("PerThread").field(&scope.id).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<factory>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextFrame;
    use std::thread;

    #[test]
    fn test_shared_returns_same_stack_across_threads() {
        let policy = ScopePolicy::shared();
        let here = policy.current_stack();

        let there = thread::scope(|s| s.spawn(|| policy.current_stack()).join().unwrap());
        assert!(Arc::ptr_eq(&here, &there));
    }

    #[test]
    fn test_per_thread_is_stable_within_a_thread() {
        let policy = ScopePolicy::per_thread();
        let first = policy.current_stack();
        let second = policy.current_stack();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_per_thread_differs_between_threads() {
        let policy = ScopePolicy::per_thread();
        let here = policy.current_stack();
        here.push(ContextFrame::of(Arc::new(1_u8)));

        let other_depth = thread::scope(|s| {
            s.spawn(|| policy.current_stack().depth()).join().unwrap()
        });
        assert_eq!(other_depth, 0);
        assert_eq!(here.depth(), 1);
    }

    #[test]
    fn test_per_thread_installations_are_isolated() {
        let first = ScopePolicy::per_thread();
        let second = ScopePolicy::per_thread();
        assert!(!Arc::ptr_eq(&first.current_stack(), &second.current_stack()));
    }

    #[test]
    fn test_release_drops_thread_stack() {
        let policy = ScopePolicy::per_thread();
        let before = policy.current_stack();
        before.push(ContextFrame::of(Arc::new(1_u8)));

        policy.release();
        let after = policy.current_stack();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.is_empty());
    }

    #[test]
    fn test_dropped_policies_are_pruned() {
        let before = thread_stack_count();
        for _ in 0..100 {
            let policy = ScopePolicy::per_thread();
            policy.current_stack().push(ContextFrame::of(Arc::new(1_u8)));
        }

        assert!(thread_stack_count() <= before + 1);
    }

    #[test]
    fn test_live_policy_survives_pruning() {
        let kept = ScopePolicy::per_thread();
        let stack = kept.current_stack();
        for _ in 0..10 {
            let _ = ScopePolicy::per_thread().current_stack();
        }

        assert!(Arc::ptr_eq(&stack, &kept.current_stack()));
    }

    #[test]
    fn test_custom_uses_factory() {
        let stack = Arc::new(ContextStack::new());
        let policy = ScopePolicy::with_stack(Arc::clone(&stack));

        assert_eq!(policy.kind(), ScopeKind::Custom);
        assert!(Arc::ptr_eq(&policy.current_stack(), &stack));
    }

    #[test]
    fn test_scope_kind_serde() {
        let json = serde_json::to_string(&ScopeKind::PerThread).unwrap();
        assert_eq!(json, "\"per_thread\"");

        let kind: ScopeKind = serde_json::from_str("\"shared\"").unwrap();
        assert_eq!(kind, ScopeKind::Shared);
        assert_eq!(ScopeKind::default(), ScopeKind::PerThread);
    }
}
