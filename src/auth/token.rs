//! OAuth 1.0a token pairs and their redacted secrets.

pub mod pair;
pub mod secret;
