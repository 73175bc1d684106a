//! Platform descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and the endpoint
//! catalogue so platforms can describe themselves in a transport-agnostic way.

/// Builder API for assembling platform descriptors.
pub mod builder;
/// Endpoint catalogue and labels.
pub mod endpoint;
/// Platform-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use endpoint::*;
pub use quirks::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, auth::PlatformId};

/// Default per-request timeout applied by the bundled transport.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Immutable platform descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
	/// Descriptor identifier.
	pub id: PlatformId,
	/// Endpoint definitions exposed by the platform.
	pub endpoints: PlatformEndpoints,
	/// Platform-specific quirks.
	pub quirks: PlatformQuirks,
	/// Upper bound for a single network call.
	pub request_timeout: StdDuration,
}
impl PlatformDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: PlatformId) -> PlatformDescriptorBuilder {
		PlatformDescriptorBuilder::new(id)
	}

	/// Preset for the X (formerly Twitter) API: OAuth 1.0a token endpoints plus the v2
	/// post-creation and `users/me` endpoints.
	pub fn twitter() -> Result<Self, DescriptorError> {
		let id = PlatformId::new("twitter").map_err(DescriptorError::InvalidId)?;

		PlatformDescriptorBuilder::new(id)
			.request_token_endpoint(parse_endpoint(
				"request_token",
				"https://api.twitter.com/oauth/request_token",
			)?)
			.authorize_endpoint(parse_endpoint(
				"authorize",
				"https://api.twitter.com/oauth/authorize",
			)?)
			.access_token_endpoint(parse_endpoint(
				"access_token",
				"https://api.twitter.com/oauth/access_token",
			)?)
			.publish_endpoint(parse_endpoint("publish", "https://api.twitter.com/2/tweets")?)
			.profile_endpoint(parse_endpoint("profile", "https://api.twitter.com/2/users/me")?)
			.post_url_base(parse_endpoint("post_url_base", "https://twitter.com")?)
			.quirks(PlatformQuirks {
				profile_query: vec![("user.fields".into(), "public_metrics".into())],
				..PlatformQuirks::default()
			})
			.build()
	}
}

/// Parses an endpoint URL, tagging failures with the endpoint name.
pub fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, DescriptorError> {
	Url::parse(raw).map_err(|source| DescriptorError::InvalidUrl { endpoint, source })
}
