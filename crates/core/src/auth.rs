//! Demo sign-in and role-based route guarding.
//!
//! This is a client-side credential check against a fixed list of demo
//! accounts. There is no token, no server session and no password
//! hashing; the signed-in [`AuthUser`] is simply persisted locally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Path of the sign-in page.
pub const LOGIN_PATH: &str = "/login";

// ---------------------------------------------------------------------------
// Role / AuthUser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Coach,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Coach => "coach",
        }
    }

    /// Landing page after sign-in.
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Parent => "/parent/basketball",
            Self::Coach => "/coach/training",
        }
    }

    /// Path prefix of the section reserved for this role.
    fn section_prefix(&self) -> &'static str {
        match self {
            Self::Parent => "/parent",
            Self::Coach => "/coach",
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
            "parent" => Ok(Self::Parent),
            "coach" => Ok(Self::Coach),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Demo accounts
// ---------------------------------------------------------------------------

/// A fixed demo credential.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub username: &'static str,
    pub password: &'static str,
    pub role: Role,
    pub name: &'static str,
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "parent001",
        password: "123456",
        role: Role::Parent,
        name: "Chen Chen (parent)",
    },
    DemoAccount {
        username: "coach001",
        password: "123456",
        role: Role::Coach,
        name: "Coach Zhang Heng",
    },
];

/// Check `username`/`password` against [`DEMO_ACCOUNTS`].
pub fn authenticate(username: &str, password: &str) -> Result<AuthUser, CoreError> {
    DEMO_ACCOUNTS
        .iter()
        .find(|a| a.username == username && a.password == password)
        .map(|a| AuthUser {
            id: a.username.to_string(),
            name: a.name.to_string(),
            role: a.role,
        })
        .ok_or_else(|| CoreError::Unauthorized("Incorrect username or password".to_string()))
}

// ---------------------------------------------------------------------------
// Route guard
// ---------------------------------------------------------------------------

/// Result of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The requested path may be shown.
    Allow,
    /// Navigate to this path instead.
    Redirect(&'static str),
}

fn in_section(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Decide whether `user` may open `path`.
///
/// - signed out: only `/login` is allowed, everything else goes there
/// - signed in: `/login`, `/` and unknown paths go to the role's home;
///   each role may only open its own section
pub fn resolve_route(user: Option<&AuthUser>, path: &str) -> RouteDecision {
    let Some(user) = user else {
        return if path == LOGIN_PATH {
            RouteDecision::Allow
        } else {
            RouteDecision::Redirect(LOGIN_PATH)
        };
    };

    if in_section(path, user.role.section_prefix()) {
        RouteDecision::Allow
    } else {
        RouteDecision::Redirect(user.role.home_path())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
