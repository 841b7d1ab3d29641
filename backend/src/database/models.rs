//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. They differ from the API models in `auth::models`, which
//! never carry the password digest.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A registered principal as stored in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
