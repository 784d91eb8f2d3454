//! Account roles and their hierarchy.
//!
//! Role names are the values carried in JWT claims and accepted by the login
//! endpoint. A higher role satisfies any lower requirement.

use serde::{Deserialize, Serialize};

use crate::store::Collection;

pub const ROLE_STUDENT: &str = "alumno";
pub const ROLE_PROFESSOR: &str = "docente";
pub const ROLE_ADMIN: &str = "admin";

/// Role names accepted by the login endpoint.
pub const ROLE_NAMES: &[&str] = &[ROLE_STUDENT, ROLE_PROFESSOR, ROLE_ADMIN];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(rename = "alumno")]
    Student,
    #[serde(rename = "docente")]
    Professor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => ROLE_STUDENT,
            Self::Professor => ROLE_PROFESSOR,
            Self::Admin => ROLE_ADMIN,
        }
    }

    /// Parse a role name. Returns `None` for unknown values.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ROLE_STUDENT => Some(Self::Student),
            ROLE_PROFESSOR => Some(Self::Professor),
            ROLE_ADMIN => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role meets the `required` level.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }

    /// Collection holding the accounts of this role.
    pub fn accounts(&self) -> Collection {
        match self {
            Self::Student => Collection::Students,
            Self::Professor => Collection::Professors,
            Self::Admin => Collection::Admins,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
