// std
use std::{net::IpAddr, time::Duration as StdDuration};
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, PlatformId},
	provider::{
		DEFAULT_REQUEST_TIMEOUT, OOB_CALLBACK, PlatformDescriptor, PlatformEndpoints,
		PlatformQuirks,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum DescriptorError {
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS (plain HTTP is only accepted for loopback hosts).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// An endpoint string could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Platform identifier failed validation.
	#[error(transparent)]
	InvalidId(IdentifierError),
	/// Callback must be `oob` or an absolute URL.
	#[error("Callback `{value}` must be `oob` or an absolute URL.")]
	InvalidCallback {
		/// Rejected callback value.
		value: String,
	},
	/// Post length limit must be positive.
	#[error("Maximum post length must be greater than zero.")]
	ZeroPostLimit,
	/// Request timeout must be positive.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
}

/// Builder for [`PlatformDescriptor`] values.
#[derive(Debug)]
pub struct PlatformDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: PlatformId,
	/// Request token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Authorization page.
	pub authorize_endpoint: Option<Url>,
	/// Access token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Post creation endpoint.
	pub publish_endpoint: Option<Url>,
	/// Profile endpoint.
	pub profile_endpoint: Option<Url>,
	/// Public site root for post URLs.
	pub post_url_base: Option<Url>,
	/// Platform-specific quirks.
	pub quirks: PlatformQuirks,
	/// Per-request timeout.
	pub request_timeout: StdDuration,
}
impl PlatformDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: PlatformId) -> Self {
		Self {
			id,
			request_token_endpoint: None,
			authorize_endpoint: None,
			access_token_endpoint: None,
			publish_endpoint: None,
			profile_endpoint: None,
			post_url_base: None,
			quirks: PlatformQuirks::default(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Sets the request token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization page.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the access token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the post creation endpoint.
	pub fn publish_endpoint(mut self, url: Url) -> Self {
		self.publish_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets the public site root used for canonical post URLs.
	pub fn post_url_base(mut self, url: Url) -> Self {
		self.post_url_base = Some(url);

		self
	}

	/// Overrides the platform quirks.
	pub fn quirks(mut self, quirks: PlatformQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Overrides the callback sent with request-token calls.
	pub fn callback(mut self, callback: impl Into<String>) -> Self {
		self.quirks.callback = callback.into();

		self
	}

	/// Overrides the per-request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<PlatformDescriptor, DescriptorError> {
		let endpoints = PlatformEndpoints {
			request_token: required("request_token", self.request_token_endpoint)?,
			authorize: required("authorize", self.authorize_endpoint)?,
			access_token: required("access_token", self.access_token_endpoint)?,
			publish: required("publish", self.publish_endpoint)?,
			profile: required("profile", self.profile_endpoint)?,
			post_url_base: required("post_url_base", self.post_url_base)?,
		};
		let descriptor = PlatformDescriptor {
			id: self.id,
			endpoints,
			quirks: self.quirks,
			request_timeout: self.request_timeout,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl PlatformDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), DescriptorError> {
		let endpoints = &self.endpoints;

		validate_endpoint("request_token", &endpoints.request_token)?;
		validate_endpoint("authorize", &endpoints.authorize)?;
		validate_endpoint("access_token", &endpoints.access_token)?;
		validate_endpoint("publish", &endpoints.publish)?;
		validate_endpoint("profile", &endpoints.profile)?;
		validate_endpoint("post_url_base", &endpoints.post_url_base)?;
		validate_callback(&self.quirks.callback)?;

		if self.quirks.max_post_chars == 0 {
			return Err(DescriptorError::ZeroPostLimit);
		}
		if self.request_timeout.is_zero() {
			return Err(DescriptorError::ZeroTimeout);
		}

		Ok(())
	}
}

fn required(endpoint: &'static str, url: Option<Url>) -> Result<Url, DescriptorError> {
	url.ok_or(DescriptorError::MissingEndpoint { endpoint })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), DescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(DescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn validate_callback(callback: &str) -> Result<(), DescriptorError> {
	if callback == OOB_CALLBACK || Url::parse(callback).is_ok() {
		Ok(())
	} else {
		Err(DescriptorError::InvalidCallback { value: callback.to_owned() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
