//! Read API over a film catalogue held in a document search store.
//!
//! Every read goes through a read-through response cache; person endpoints
//! rebuild the person/film relationship from per-role nested queries.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
