//! Process-wide dependencies, assembled once at startup.
//!
//! `AppContext` owns the store handles; `ServiceRegistry` holds exactly one
//! instance per service type built from that context. Both are passed
//! explicitly to whatever needs them.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::films::FilmService;
use crate::application::genres::GenreService;
use crate::application::persons::PersonService;
use crate::application::store::DocumentStore;
use crate::cache::CacheStore;

#[derive(Clone)]
pub struct AppContext {
    pub documents: Arc<dyn DocumentStore>,
    /// `None` when response caching is disabled or the backend is unreachable.
    pub cache: Option<Arc<dyn CacheStore>>,
    pub role_query_limit: u32,
}

impl AppContext {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        cache: Option<Arc<dyn CacheStore>>,
        role_query_limit: u32,
    ) -> Self {
        Self {
            documents,
            cache,
            role_query_limit,
        }
    }
}

#[derive(Default, Clone)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every read service wired to the context's document store.
    pub fn from_context(context: &AppContext) -> Self {
        let mut registry = Self::new();
        registry.insert(FilmService::new(context.documents.clone()));
        registry.insert(GenreService::new(context.documents.clone()));
        registry.insert(PersonService::new(
            context.documents.clone(),
            context.role_query_limit,
        ));
        registry
    }

    /// Register `service`, replacing any earlier instance of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, AppError> {
        self.get::<T>().ok_or_else(|| {
            AppError::unexpected(format!("service `{}` is not registered", type_name::<T>()))
        })
    }
}
