//! Data access layer.

pub mod user_repository;

pub use user_repository::{CredentialStore, UserRepository};
