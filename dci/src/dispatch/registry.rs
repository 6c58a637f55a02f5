//! Registry mapping context types to their entry methods.

use super::DEFAULT_ENTRY_METHOD;
use crate::context::ContextValue;
use crate::engine::Engine;
use crate::errors::DciError;
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

type ErasedOutput = Box<dyn Any + Send>;
type ErasedFailure = Box<dyn Any + Send>;
type EntryFn =
    Arc<dyn Fn(&dyn Any, &Engine) -> Result<ErasedOutput, ErasedFailure> + Send + Sync>;

/// A context that knows how to run itself.
///
/// Implementors can be registered with [`EntryRegistry::register_executable`]
/// under the default entry method name.
pub trait Executable: Any + Send + Sync {
    /// The value produced by a run.
    type Output: Any + Send;
    /// The failure produced by a run.
    type Error: Any + Send;

    /// Runs the use case. The context is already on top of the stack.
    fn execute(&self, engine: &Engine) -> Result<Self::Output, Self::Error>;
}

/// A registered, type-erased entry method.
#[derive(Clone)]
pub(crate) struct EntryPoint {
    context: &'static str,
    method: String,
    output: TypeId,
    error: TypeId,
    invoke: EntryFn,
}

impl EntryPoint {
    /// Checks that the entry produces `R` and fails with `E` (or with engine
    /// errors convertible into `E`).
    pub(crate) fn check_signature<R: Any, E: Any>(&self) -> Result<(), DciError> {
        if self.output != TypeId::of::<R>() {
            return Err(self.mismatch(type_name::<R>()));
        }
        if self.error != TypeId::of::<E>() && self.error != TypeId::of::<DciError>() {
            return Err(self.mismatch(type_name::<E>()));
        }
        Ok(())
    }

    /// Invokes the entry and restores the caller's result and error types.
    pub(crate) fn invoke<R, E>(&self, context: &dyn Any, engine: &Engine) -> Result<R, E>
    where
        R: Any,
        E: From<DciError> + Any,
    {
        match (self.invoke)(context, engine) {
            Ok(output) => output
                .downcast::<R>()
                .map(|output| *output)
                .map_err(|_| E::from(self.mismatch(type_name::<R>()))),
            Err(failure) => Err(self.unwrap_failure(failure)),
        }
    }

    /// Strips the type-erased box so the caller sees the original failure.
    fn unwrap_failure<E>(&self, failure: ErasedFailure) -> E
    where
        E: From<DciError> + Any,
    {
        let failure = match failure.downcast::<E>() {
            Ok(original) => return *original,
            Err(other) => other,
        };
        match failure.downcast::<DciError>() {
            Ok(engine_error) => E::from(*engine_error),
            Err(_) => E::from(self.mismatch(type_name::<E>())),
        }
    }

    fn mismatch(&self, expected: &'static str) -> DciError {
        DciError::entry_signature(self.context, self.method.clone(), expected)
    }
}

/// Registry of entry methods keyed by context type and method name.
#[derive(Default)]
pub struct EntryRegistry {
    entries: DashMap<(TypeId, String), EntryPoint>,
}

impl EntryRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` as the method named `method` on contexts of type `C`.
    ///
    /// Registering the same type and name again replaces the previous entry.
    pub fn register<C, R, E, F>(&self, method: impl Into<String>, entry: F)
    where
        C: Any + Send + Sync,
        R: Any + Send,
        E: Any + Send,
        F: Fn(&C, &Engine) -> Result<R, E> + Send + Sync + 'static,
    {
        let method = method.into();
        let entry_method = method.clone();
        let invoke: EntryFn = Arc::new(move |context: &dyn Any, engine: &Engine| {
            let Some(context) = context.downcast_ref::<C>() else {
                let mismatch =
                    DciError::entry_signature(type_name::<C>(), entry_method.clone(), type_name::<C>());
                return Err(Box::new(mismatch) as ErasedFailure);
            };
            entry(context, engine)
                .map(|output| Box::new(output) as ErasedOutput)
                .map_err(|failure| Box::new(failure) as ErasedFailure)
        });

        self.entries.insert(
            (TypeId::of::<C>(), method.clone()),
            EntryPoint {
                context: type_name::<C>(),
                method,
                output: TypeId::of::<R>(),
                error: TypeId::of::<E>(),
                invoke,
            },
        );
    }

    /// Registers an [`Executable`] context under the default entry method.
    pub fn register_executable<C: Executable>(&self) {
        self.register::<C, C::Output, C::Error, _>(DEFAULT_ENTRY_METHOD, |context: &C, engine| {
            context.execute(engine)
        });
    }

    /// Finds the entry named `method` for the context's concrete type.
    pub(crate) fn lookup(
        &self,
        context: &dyn ContextValue,
        method: &str,
    ) -> Result<EntryPoint, DciError> {
        let type_id = ContextValue::as_any(context).type_id();
        self.entries
            .get(&(type_id, method.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DciError::no_execution_method(ContextValue::type_name(context), method))
    }

    /// Checks if `C` has an entry named `method`.
    #[must_use]
    pub fn contains<C: Any>(&self, method: &str) -> bool {
        self.entries.contains_key(&(TypeId::of::<C>(), method.to_string()))
    }

    /// Lists the entry method names registered for `C`.
    #[must_use]
    pub fn methods_for<C: Any>(&self) -> Vec<String> {
        let type_id = TypeId::of::<C>();
        let mut methods: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == type_id)
            .map(|entry| entry.key().1.clone())
            .collect();
        methods.sort();
        methods
    }

    /// Returns the number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for EntryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRegistry")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    enum ReportError {
        Engine(DciError),
        Empty,
    }

    impl From<DciError> for ReportError {
        fn from(err: DciError) -> Self {
            Self::Engine(err)
        }
    }

    struct Report {
        lines: Vec<String>,
    }

    impl Executable for Report {
        type Output = usize;
        type Error = ReportError;

        fn execute(&self, _engine: &Engine) -> Result<usize, ReportError> {
            if self.lines.is_empty() {
                Err(ReportError::Empty)
            } else {
                Ok(self.lines.len())
            }
        }
    }

    fn report(lines: &[&str]) -> Report {
        Report {
            lines: lines.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_register_executable_uses_default_name() {
        let registry = EntryRegistry::new();
        registry.register_executable::<Report>();

        assert!(registry.contains::<Report>(DEFAULT_ENTRY_METHOD));
        assert_eq!(registry.methods_for::<Report>(), vec!["execute".to_string()]);
    }

    #[test]
    fn test_lookup_missing_method() {
        let registry = EntryRegistry::new();
        registry.register_executable::<Report>();

        let context = report(&["a"]);
        let err = registry.lookup(&context, "run").err().unwrap();
        assert!(matches!(err, DciError::NoExecutionMethod { ref method, .. } if method == "run"));
    }

    #[test]
    fn test_invoke_returns_output() {
        let registry = EntryRegistry::new();
        registry.register_executable::<Report>();
        let engine = Engine::new();

        let context = report(&["a", "b"]);
        let entry = registry.lookup(&context, "execute").unwrap();
        entry.check_signature::<usize, ReportError>().unwrap();

        let lines: Result<usize, ReportError> = entry.invoke(&context, &engine);
        assert_eq!(lines, Ok(2));
    }

    #[test]
    fn test_invoke_restores_original_failure() {
        let registry = EntryRegistry::new();
        registry.register_executable::<Report>();
        let engine = Engine::new();

        let context = report(&[]);
        let entry = registry.lookup(&context, "execute").unwrap();
        let result: Result<usize, ReportError> = entry.invoke(&context, &engine);
        assert_eq!(result, Err(ReportError::Empty));
    }

    #[test]
    fn test_signature_mismatch_detected() {
        let registry = EntryRegistry::new();
        registry.register_executable::<Report>();

        let context = report(&["a"]);
        let entry = registry.lookup(&context, "execute").unwrap();

        assert!(matches!(
            entry.check_signature::<String, ReportError>(),
            Err(DciError::EntrySignatureMismatch { .. })
        ));
        assert!(matches!(
            entry.check_signature::<usize, std::io::Error>(),
            Err(DciError::EntrySignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_engine_error_entries_fit_any_caller_error() {
        let registry = EntryRegistry::new();
        registry.register("audit", |_: &Report, _: &Engine| -> Result<(), DciError> {
            Err(DciError::EmptyStack)
        });
        let engine = Engine::new();

        let context = report(&["a"]);
        let entry = registry.lookup(&context, "audit").unwrap();
        entry.check_signature::<(), ReportError>().unwrap();

        let result: Result<(), ReportError> = entry.invoke(&context, &engine);
        assert_eq!(result, Err(ReportError::Engine(DciError::EmptyStack)));
    }

    #[test]
    fn test_reregister_replaces_entry() {
        let registry = EntryRegistry::new();
        registry.register("count", |_: &Report, _: &Engine| -> Result<usize, DciError> { Ok(1) });
        registry.register("count", |_: &Report, _: &Engine| -> Result<usize, DciError> { Ok(2) });
        assert_eq!(registry.len(), 1);

        let engine = Engine::new();
        let context = report(&[]);
        let entry = registry.lookup(&context, "count").unwrap();
        let count: Result<usize, DciError> = entry.invoke(&context, &engine);
        assert_eq!(count, Ok(2));
    }
}
