pub mod admin;
pub mod course;
pub mod error;
pub mod item;
pub mod role;
pub mod user;

pub use error::*;
