pub mod error;
pub mod films;
pub mod genres;
pub mod pagination;
pub mod persons;
pub mod query;
pub mod registry;
pub mod store;
