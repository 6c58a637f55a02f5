//! Dependency resolution seam.
//!
//! The engine only holds a reference to a [`DependencyResolver`] and forwards
//! typed lookups to it. [`ServiceRegistry`] is a small type-keyed default
//! implementation.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// A shared, type-erased service instance.
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Factory function type for transient services.
pub type ServiceFactory = Box<dyn Fn() -> ServiceRef + Send + Sync>;

/// Resolves services by type.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyResolver: Send + Sync {
    /// Returns a single service for the type, if any.
    fn resolve(&self, service: TypeId) -> Option<ServiceRef>;

    /// Returns every service registered for the type.
    fn resolve_all(&self, service: TypeId) -> Vec<ServiceRef>;
}

/// Registry for service instances and factories.
#[derive(Default)]
pub struct ServiceRegistry {
    /// Registered instances, in registration order.
    instances: RwLock<HashMap<TypeId, Vec<ServiceRef>>>,
    /// Registered factories.
    factories: RwLock<HashMap<TypeId, ServiceFactory>>,
}

impl ServiceRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service instance.
    pub fn register<T: Any + Send + Sync>(&self, service: Arc<T>) {
        self.instances
            .write()
            .entry(TypeId::of::<T>())
            .or_default()
            .push(service);
    }

    /// Registers a factory producing a fresh instance per resolution.
    pub fn register_factory<T, F>(&self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Box::new(move || Arc::new(factory()) as ServiceRef);
        self.factories.write().insert(TypeId::of::<T>(), factory);
    }

    /// Checks if anything is registered for a type.
    #[must_use]
    pub fn contains(&self, service: TypeId) -> bool {
        self.instances.read().contains_key(&service) || self.factories.read().contains_key(&service)
    }

    /// Returns the number of registered service types.
    #[must_use]
    pub fn len(&self) -> usize {
        let instances = self.instances.read();
        let factories = self.factories.read();
        instances.len()
            + factories
                .keys()
                .filter(|key| !instances.contains_key(key))
                .count()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all registered services.
    pub fn clear(&self) {
        self.instances.write().clear();
        self.factories.write().clear();
    }
}

impl DependencyResolver for ServiceRegistry {
    /// Returns the most recently registered instance, falling back to the
    /// factory.
    fn resolve(&self, service: TypeId) -> Option<ServiceRef> {
        if let Some(instance) = self
            .instances
            .read()
            .get(&service)
            .and_then(|instances| instances.last())
        {
            return Some(Arc::clone(instance));
        }

        self.factories.read().get(&service).map(|factory| factory())
    }

    fn resolve_all(&self, service: TypeId) -> Vec<ServiceRef> {
        let mut all: Vec<ServiceRef> = self
            .instances
            .read()
            .get(&service)
            .cloned()
            .unwrap_or_default();

        if let Some(factory) = self.factories.read().get(&service) {
            all.push(factory());
        }
        all
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("instance_types", &self.instances.read().len())
            .field("factory_types", &self.factories.read().len())
            .finish()
    }
}
