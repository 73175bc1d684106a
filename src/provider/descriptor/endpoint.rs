// self
use crate::_prelude::*;

/// Remote endpoints a publisher calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Temporary credential (request token) endpoint.
	RequestToken,
	/// Token credential (access token) endpoint.
	AccessToken,
	/// Post creation endpoint.
	Publish,
	/// Authenticated-user profile endpoint.
	Profile,
}
impl EndpointKind {
	/// Returns a stable label suitable for logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::RequestToken => "request_token",
			EndpointKind::AccessToken => "access_token",
			EndpointKind::Publish => "publish",
			EndpointKind::Profile => "profile",
		}
	}

	/// Returns `true` for the two OAuth token endpoints.
	pub const fn is_token_endpoint(self) -> bool {
		matches!(self, EndpointKind::RequestToken | EndpointKind::AccessToken)
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set declared by a platform descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEndpoints {
	/// Request token endpoint (`POST`, signed with consumer credentials only).
	pub request_token: Url,
	/// User-facing authorization page; receives `oauth_token` as a query parameter.
	pub authorize: Url,
	/// Access token endpoint (`POST`, carries `oauth_verifier`).
	pub access_token: Url,
	/// Post creation endpoint (`POST` with a JSON body).
	pub publish: Url,
	/// Authenticated-user profile endpoint (`GET`).
	pub profile: Url,
	/// Public site root used to build canonical post URLs.
	pub post_url_base: Url,
}
impl PlatformEndpoints {
	/// Canonical URL of a post authored by `username`.
	pub fn post_url(&self, username: &str, post_id: &str) -> String {
		format!("{}/{username}/status/{post_id}", self.site_root())
	}

	/// Username-independent URL, used when the author's handle is unknown.
	pub fn fallback_post_url(&self, post_id: &str) -> String {
		format!("{}/i/status/{post_id}", self.site_root())
	}

	fn site_root(&self) -> &str {
		self.post_url_base.as_str().trim_end_matches('/')
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(EndpointKind::RequestToken.to_string(), "request_token");
		assert_eq!(EndpointKind::Publish.as_str(), "publish");
		assert!(EndpointKind::AccessToken.is_token_endpoint());
		assert!(!EndpointKind::Profile.is_token_endpoint());
	}
}
