//! Collection of cryptographic helpers shared by the authentication flow.
//!
//! Password hashing and bearer token handling live here so that the service
//! layer and the middleware can use them without depending on each other.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenError, TokenIssuer};
pub use password::PasswordHasher;
