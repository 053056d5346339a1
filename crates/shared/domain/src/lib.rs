//! Domain layer - Core business entities and value objects.
//!
//! This crate contains the user entity, its storage codec and the key
//! layout, with no store client dependencies.

pub mod constants;
pub mod error;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use user::User;
