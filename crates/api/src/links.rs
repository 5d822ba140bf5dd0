//! HAL-style hypermedia links.

use std::collections::BTreeMap;

use euclid_identity::Identifier;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Link {
    pub href: String,
}

/// Relation name to link, serialized as the `_links` object.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rel: &str, href: impl Into<String>) -> Self {
        self.0.insert(rel.to_string(), Link { href: href.into() });
        self
    }

    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.get(rel)
    }
}

pub const USERS: &str = "/internal/users";
pub const COURSES: &str = "/internal/courses";

pub fn user(id: &Identifier) -> String {
    format!("/internal/user/{id}")
}

pub fn user_courses(id: &Identifier) -> String {
    format!("/internal/user/{id}/courses")
}

pub fn course(id: &Identifier) -> String {
    format!("/internal/course/{id}")
}

pub fn course_members(id: &Identifier) -> String {
    format!("/internal/course/{id}/members")
}

pub fn course_roles(id: &Identifier) -> String {
    format!("/internal/course/{id}/roles")
}

pub fn course_items(id: &Identifier) -> String {
    format!("/internal/course/{id}/items")
}

pub fn item(id: &Identifier) -> String {
    format!("/internal/item/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_serialize_as_relation_map() {
        let id = Identifier::from_bytes([0; 18]);
        let links = Links::new().with("self", user(&id)).with("all", USERS);

        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(
            json["self"]["href"],
            "/internal/user/AAAAAAAAAAAAAAAAAAAAAAAA"
        );
        assert_eq!(json["all"]["href"], "/internal/users");
    }
}
