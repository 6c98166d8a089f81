//! Shared domain enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relationship a person can hold with respect to a film.
///
/// Declaration order is significant: aggregation walks roles in the order of
/// [`Role::ALL`], and every merged role list is reported in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Director,
    Writer,
    Actor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Director, Role::Writer, Role::Actor];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Writer => "writer",
            Role::Actor => "actor",
        }
    }

    /// Nested field on a film document listing the people who held this role.
    pub fn nested_path(self) -> &'static str {
        match self {
            Role::Director => "directors",
            Role::Writer => "writers",
            Role::Actor => "actors",
        }
    }

    /// Fully qualified id field inside [`Role::nested_path`].
    pub fn id_field(self) -> String {
        format!("{}.id", self.nested_path())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
