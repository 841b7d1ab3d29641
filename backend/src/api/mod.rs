//! Shared building blocks for the HTTP API.
//!
//! The authentication routes themselves live in `auth`; this module holds the
//! response and error conventions they share.

pub mod common;
