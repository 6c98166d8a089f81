mod films;
mod genres;
mod persons;

pub use films::{get_film, list_films, search_films};
pub use genres::{get_genre, list_genres};
pub use persons::{get_person, list_person_films, search_persons};
