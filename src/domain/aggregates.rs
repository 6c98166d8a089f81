//! Person/film views rebuilt from per-role film hits.
//!
//! The store only keeps the person → film relationship as nested arrays on
//! film documents, so the application issues one query per [`Role`] and the
//! merges here fold those hit lists into the two derived views. Both merges
//! walk roles in [`Role::ALL`] order, whatever order the hit lists arrive in.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::entities::{FilmSummary, HasFilmId};
use super::types::Role;

/// Hits returned by one per-role sub-query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleHits<T> {
    pub role: Role,
    pub films: Vec<T>,
}

impl<T> RoleHits<T> {
    pub fn new(role: Role, films: Vec<T>) -> Self {
        Self { role, films }
    }
}

fn in_role_order<T>(hits: &[RoleHits<T>]) -> impl Iterator<Item = &RoleHits<T>> {
    Role::ALL
        .into_iter()
        .flat_map(move |role| hits.iter().filter(move |entry| entry.role == role))
}

/// Roles a person held and every film they appear in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonAggregate {
    pub person_id: String,
    pub roles: Vec<Role>,
    /// Distinct film ids in ascending order.
    pub film_ids: Vec<String>,
}

impl PersonAggregate {
    pub fn merge<T: HasFilmId>(person_id: impl Into<String>, hits: &[RoleHits<T>]) -> Self {
        let mut roles = Vec::new();
        let mut film_ids = BTreeSet::new();

        for entry in in_role_order(hits) {
            if entry.films.is_empty() {
                continue;
            }
            if !roles.contains(&entry.role) {
                roles.push(entry.role);
            }
            film_ids.extend(entry.films.iter().map(|film| film.film_id().to_string()));
        }

        Self {
            person_id: person_id.into(),
            roles,
            film_ids: film_ids.into_iter().collect(),
        }
    }
}

/// One film a person appears in, with the roles held in that film.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonFilm {
    pub film: FilmSummary,
    pub roles: Vec<Role>,
}

/// Films of one person, ordered by first sighting while scanning roles in
/// enumeration order and, within a role, in store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonFilmAggregate {
    pub person_id: String,
    pub films: Vec<PersonFilm>,
}

impl PersonFilmAggregate {
    pub fn merge(person_id: impl Into<String>, hits: &[RoleHits<FilmSummary>]) -> Self {
        let mut films: Vec<PersonFilm> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in in_role_order(hits) {
            for film in &entry.films {
                match positions.get(&film.id) {
                    Some(&index) => {
                        let roles = &mut films[index].roles;
                        if !roles.contains(&entry.role) {
                            roles.push(entry.role);
                        }
                    }
                    None => {
                        positions.insert(film.id.clone(), films.len());
                        films.push(PersonFilm {
                            film: film.clone(),
                            roles: vec![entry.role],
                        });
                    }
                }
            }
        }

        Self {
            person_id: person_id.into(),
            films,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FilmId;

    fn id(value: &str) -> FilmId {
        FilmId {
            id: value.to_string(),
        }
    }

    fn summary(value: &str, rating: f64) -> FilmSummary {
        FilmSummary {
            id: value.to_string(),
            title: format!("Film {value}"),
            imdb_rating: Some(rating),
        }
    }

    #[test]
    fn collects_roles_in_enumeration_order_and_unique_film_ids() {
        // Director and writer on A, actor on B; hits arrive out of order.
        let hits = vec![
            RoleHits::new(Role::Actor, vec![id("b")]),
            RoleHits::new(Role::Director, vec![id("a")]),
            RoleHits::new(Role::Writer, vec![id("a")]),
        ];

        let aggregate = PersonAggregate::merge("p1", &hits);

        assert_eq!(aggregate.person_id, "p1");
        assert_eq!(aggregate.roles, vec![Role::Director, Role::Writer, Role::Actor]);
        assert_eq!(aggregate.film_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn roles_without_hits_are_left_out() {
        let hits = vec![
            RoleHits::new(Role::Director, Vec::<FilmId>::new()),
            RoleHits::new(Role::Writer, vec![id("a")]),
            RoleHits::new(Role::Actor, Vec::new()),
        ];

        let aggregate = PersonAggregate::merge("p1", &hits);

        assert_eq!(aggregate.roles, vec![Role::Writer]);
        assert_eq!(aggregate.film_ids, vec!["a".to_string()]);
    }

    #[test]
    fn zero_hits_yield_empty_aggregate() {
        let hits: Vec<RoleHits<FilmId>> = Role::ALL
            .into_iter()
            .map(|role| RoleHits::new(role, Vec::new()))
            .collect();

        let aggregate = PersonAggregate::merge("p1", &hits);

        assert!(aggregate.roles.is_empty());
        assert!(aggregate.film_ids.is_empty());
    }

    #[test]
    fn film_with_several_roles_appears_once_with_every_role() {
        let a = summary("a", 8.7);
        let b = summary("b", 8.3);
        let hits = vec![
            RoleHits::new(Role::Director, vec![b.clone()]),
            RoleHits::new(Role::Writer, vec![b.clone()]),
            RoleHits::new(Role::Actor, vec![a.clone(), b.clone()]),
        ];

        let aggregate = PersonFilmAggregate::merge("p1", &hits);

        assert_eq!(
            aggregate.films,
            vec![
                PersonFilm {
                    film: b,
                    roles: vec![Role::Director, Role::Writer, Role::Actor],
                },
                PersonFilm {
                    film: a,
                    roles: vec![Role::Actor],
                },
            ]
        );
    }

    #[test]
    fn per_film_roles_are_not_the_global_role_set() {
        let a = summary("a", 8.7);
        let b = summary("b", 8.3);
        let hits = vec![
            RoleHits::new(Role::Director, vec![a.clone()]),
            RoleHits::new(Role::Writer, vec![a.clone(), b.clone()]),
            RoleHits::new(Role::Actor, Vec::new()),
        ];

        let aggregate = PersonFilmAggregate::merge("p1", &hits);

        assert_eq!(aggregate.films.len(), 2);
        assert_eq!(aggregate.films[0].film.id, "a");
        assert_eq!(aggregate.films[0].roles, vec![Role::Director, Role::Writer]);
        assert_eq!(aggregate.films[1].film.id, "b");
        assert_eq!(aggregate.films[1].roles, vec![Role::Writer]);
    }

    #[test]
    fn merge_is_independent_of_arrival_order() {
        let a = summary("a", 8.7);
        let b = summary("b", 8.3);
        let ordered = vec![
            RoleHits::new(Role::Director, vec![b.clone()]),
            RoleHits::new(Role::Writer, vec![a.clone()]),
            RoleHits::new(Role::Actor, vec![a.clone(), b.clone()]),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();

        assert_eq!(
            PersonFilmAggregate::merge("p1", &ordered),
            PersonFilmAggregate::merge("p1", &shuffled)
        );
    }
}
