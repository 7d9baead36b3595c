//! Administrator authentication: HTTP Basic credentials checked against
//! Argon2 password hashes.

pub mod authenticate;
pub mod password;
