//! Dependency-resolution surface, delegating to the installed resolver.

use super::Engine;
use crate::errors::DciError;
use crate::resolver::{DependencyResolver, ServiceRef};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

impl Engine {
    /// Resolves a single service of type `T`.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>, DciError> {
        let service = self
            .resolver()?
            .resolve(TypeId::of::<T>())
            .ok_or_else(|| DciError::service_not_found(type_name::<T>()))?;
        service
            .downcast::<T>()
            .map_err(|_| DciError::service_type_mismatch(type_name::<T>()))
    }

    /// Resolves every service of type `T`.
    pub fn resolve_all<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>, DciError> {
        self.resolver()?
            .resolve_all(TypeId::of::<T>())
            .into_iter()
            .map(|service| {
                service
                    .downcast::<T>()
                    .map_err(|_| DciError::service_type_mismatch(type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a single service by type id.
    pub fn resolve_type(&self, service: TypeId) -> Result<ServiceRef, DciError> {
        self.resolver()?
            .resolve(service)
            .ok_or_else(|| DciError::service_not_found(format!("{service:?}")))
    }

    /// Resolves every service by type id.
    pub fn resolve_all_type(&self, service: TypeId) -> Result<Vec<ServiceRef>, DciError> {
        Ok(self.resolver()?.resolve_all(service))
    }

    /// Returns true if a dependency resolver is set.
    #[must_use]
    pub fn has_resolver(&self) -> bool {
        self.state.read().resolver.is_some()
    }

    fn resolver(&self) -> Result<Arc<dyn DependencyResolver>, DciError> {
        self.state
            .read()
            .resolver
            .clone()
            .ok_or(DciError::ResolverNotSet)
    }
}
