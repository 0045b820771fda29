use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canonical privilege tier for a session.
///
/// Roles form a strict total order, least to most privileged, in declaration
/// order. `NonUser` means "no session" and is never persisted to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    NonUser,
    Reader,
    Writer,
    Admin,
    Developer,
    Superadmin,
}

/// Raw claim spellings that map onto a canonical role.
const ALIASES: &[(&str, Role)] = &[("author", Role::Writer)];

impl Role {
    /// All canonical roles in rank order.
    pub const ALL: [Role; 6] = [
        Role::NonUser,
        Role::Reader,
        Role::Writer,
        Role::Admin,
        Role::Developer,
        Role::Superadmin,
    ];

    /// Roles an account row may carry (everything except `NonUser`).
    pub const PERSISTABLE: [Role; 5] = [
        Role::Reader,
        Role::Writer,
        Role::Admin,
        Role::Developer,
        Role::Superadmin,
    ];

    /// Maps an arbitrary raw role claim to exactly one canonical role.
    ///
    /// Total: trims and lowercases, resolves aliases, and downgrades anything
    /// absent or unrecognized to `NonUser`. Unknown claims never pass through
    /// and never grant privilege.
    pub fn normalize(raw: Option<&str>) -> Role {
        let Some(raw) = raw else {
            return Role::NonUser;
        };
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Role::NonUser;
        }

        if let Some((_, role)) = ALIASES.iter().find(|(alias, _)| *alias == value) {
            return *role;
        }

        match value.as_str() {
            "non-user" => Role::NonUser,
            "reader" => Role::Reader,
            "writer" => Role::Writer,
            "admin" => Role::Admin,
            "developer" => Role::Developer,
            "superadmin" => Role::Superadmin,
            _ => Role::NonUser,
        }
    }

    /// Like [`Role::normalize`], but floors `NonUser` to `Reader`.
    ///
    /// Used wherever a concrete account-bearing role is required, e.g. before
    /// writing a user row. The result is always persistable.
    pub fn normalize_user(raw: Option<&str>) -> Role {
        match Self::normalize(raw) {
            Role::NonUser => Role::Reader,
            role => role,
        }
    }

    /// Position in the privilege order. Strictly increasing in rank order.
    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    /// Ordinal comparison against a required minimum: `rank(self) >= rank(min)`.
    pub fn meets(self, min: Role) -> bool {
        self.rank() >= min.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::NonUser => "non-user",
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
