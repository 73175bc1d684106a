//! App-level consumer credentials.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Consumer key and secret identifying the application; read-only after load.
///
/// These never share a file with user tokens. The store persists access tokens only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Consumer key sent as `oauth_consumer_key`.
	pub consumer_key: String,
	/// Consumer secret; first half of every signing key.
	pub consumer_secret: TokenSecret,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<TokenSecret>) -> Self {
		Self { consumer_key: consumer_key.into(), consumer_secret: consumer_secret.into() }
	}
}
