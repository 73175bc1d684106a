//! OAuth 1.0a (RFC 5849) HMAC-SHA1 request signing.
//!
//! `encode` holds the single percent-encoder applied to every signature input, `signature`
//! is the pure signing function checked against fixed vectors, `nonce` supplies fresh
//! `oauth_nonce`/`oauth_timestamp` pairs, `header` renders the `Authorization: OAuth ...`
//! value, and `request` ties them together behind the [`Signer`] capability that flows use.

pub mod encode;
pub mod header;
pub mod nonce;
pub mod request;
pub mod signature;

pub use encode::percent_encode;
pub use header::authorization_header;
pub use nonce::*;
pub use request::*;
pub use signature::{base_string, base_string_uri, normalize_parameters, sign, signing_key};
