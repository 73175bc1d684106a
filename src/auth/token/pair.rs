//! Request and access token pairs plus the form-encoded token endpoint response.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserProfile},
	error::{AuthError, TransientError},
	provider::EndpointKind,
};

/// Borrowed `{token, secret}` view handed to signers.
#[derive(Clone, Copy, Debug)]
pub struct TokenRef<'a> {
	/// Public token value sent as `oauth_token`.
	pub token: &'a str,
	/// Secret half of the pair; only feeds the signing key.
	pub secret: &'a TokenSecret,
}

/// Short-lived token that only exists between the authorize redirect and the verifier exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken {
	/// Public request token value.
	pub token: String,
	/// Request token secret.
	pub secret: TokenSecret,
}
impl RequestToken {
	/// Creates a new request token pair.
	pub fn new(token: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), secret: secret.into() }
	}

	/// Borrows the pair for signing.
	pub fn as_token_ref(&self) -> TokenRef<'_> {
		TokenRef { token: &self.token, secret: &self.secret }
	}
}

/// Long-lived token representing one connected account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
	/// Public access token value.
	pub token: String,
	/// Access token secret.
	pub secret: TokenSecret,
}
impl AccessToken {
	/// Creates a new access token pair.
	pub fn new(token: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), secret: secret.into() }
	}

	/// Borrows the pair for signing.
	pub fn as_token_ref(&self) -> TokenRef<'_> {
		TokenRef { token: &self.token, secret: &self.secret }
	}
}

/// Parsed `application/x-www-form-urlencoded` body from a token endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TokenResponse {
	pub(crate) token: String,
	pub(crate) secret: TokenSecret,
	pub(crate) callback_confirmed: Option<bool>,
	pub(crate) user_id: Option<String>,
	pub(crate) screen_name: Option<String>,
}
impl TokenResponse {
	pub(crate) fn parse(endpoint: EndpointKind, body: &str) -> Result<Self> {
		let mut token = None;
		let mut secret = None;
		let mut response = TokenResponse::default();

		for (key, value) in form_urlencoded::parse(body.trim().as_bytes()) {
			match &*key {
				"oauth_token" => token = Some(value.into_owned()),
				"oauth_token_secret" => secret = Some(value.into_owned()),
				"oauth_callback_confirmed" =>
					response.callback_confirmed = Some(value.eq_ignore_ascii_case("true")),
				"user_id" => response.user_id = Some(value.into_owned()),
				"screen_name" => response.screen_name = Some(value.into_owned()),
				_ => {},
			}
		}

		match (token.filter(|t| !t.is_empty()), secret.filter(|s| !s.is_empty())) {
			(Some(token), Some(secret)) => {
				response.token = token;
				response.secret = TokenSecret::new(secret);

				Ok(response)
			},
			_ => Err(TransientError::UnexpectedResponse {
				endpoint,
				message: "response is missing oauth_token or oauth_token_secret".into(),
			}
			.into()),
		}
	}

	pub(crate) fn into_request_token(self) -> Result<RequestToken> {
		if self.callback_confirmed == Some(false) {
			return Err(AuthError::CallbackNotConfirmed.into());
		}

		Ok(RequestToken { token: self.token, secret: self.secret })
	}

	pub(crate) fn into_access_token(self) -> (AccessToken, Option<UserProfile>) {
		let profile = match (self.user_id, self.screen_name) {
			(Some(id), Some(username)) => Some(UserProfile::from_handle(id, username)),
			_ => None,
		};

		(AccessToken { token: self.token, secret: self.secret }, profile)
	}
}
