//! The closed set of account roles.
//!
//! Role names must match the `chk_users_role` constraint in
//! `20260101000001_create_identity_tables.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";

/// Account role carried on every authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    /// The role name as stored in the `users.role` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => ROLE_TEACHER,
            Role::Student => ROLE_STUDENT,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_TEACHER => Ok(Role::Teacher),
            ROLE_STUDENT => Ok(Role::Student),
            other => Err(CoreError::Validation(format!("Invalid role: {other}"))),
        }
    }
}
