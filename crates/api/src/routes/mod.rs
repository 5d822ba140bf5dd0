pub mod admin;
pub mod auth;
pub mod courses;
pub mod health;
pub mod items;
pub mod models;
pub mod roles;
pub mod users;
