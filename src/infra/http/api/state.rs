use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::films::FilmService;
use crate::application::genres::GenreService;
use crate::application::persons::PersonService;
use crate::application::registry::ServiceRegistry;

#[derive(Clone)]
pub struct ApiState {
    pub films: Arc<FilmService>,
    pub genres: Arc<GenreService>,
    pub persons: Arc<PersonService>,
}

impl ApiState {
    pub fn from_registry(registry: &ServiceRegistry) -> Result<Self, AppError> {
        Ok(Self {
            films: registry.require::<FilmService>()?,
            genres: registry.require::<GenreService>()?,
            persons: registry.require::<PersonService>()?,
        })
    }
}
