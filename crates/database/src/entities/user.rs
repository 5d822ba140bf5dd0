//! User entity definitions

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use euclid_identity::Identifier;
use serde::Serialize;

pub const AUTHORITY_USER: &str = "USER";
pub const AUTHORITY_ADMIN: &str = "ADMIN";

/// A registered account.
///
/// Equality and hashing consider only the identifier.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Identifier,
    pub display_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub locked: bool,
    pub credentials_expired: bool,
    pub account_expired: bool,
    pub enabled: bool,
    pub authorities: BTreeSet<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Whether the account may log in and act.
    pub fn is_accessible(&self) -> bool {
        self.enabled && !self.locked && !self.credentials_expired && !self.account_expired
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub display_name: String,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub authorities: BTreeSet<String>,
}

impl NewUser {
    /// Builds a request carrying only the `USER` authority.
    pub fn with_default_authorities(
        display_name: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            email: email.into(),
            birthday,
            authorities: default_authorities(),
        }
    }
}

/// Full replacement of a user's editable profile fields.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

pub fn default_authorities() -> BTreeSet<String> {
    BTreeSet::from([AUTHORITY_USER.to_string()])
}

pub(crate) fn parse_authorities(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn join_authorities(authorities: &BTreeSet<String>) -> String {
    authorities
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
