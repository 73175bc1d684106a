//! Platform strategy hooks that customize error mapping and publish bodies.
//!
//! Implementations classify failed responses and decorate outgoing post payloads
//! without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Strategy hook that allows platforms to classify errors and decorate requests.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data
/// types so downstream crates never depend on reqwest-specific structures. Override only
/// what you need: `augment_publish_body` has a default no-op implementation.
pub trait PlatformStrategy: Send + Sync {
	/// Maps a failed response into the publisher taxonomy.
	fn classify_error(&self, ctx: &ErrorContext) -> ErrorClass;

	/// Gives platforms a chance to add JSON fields to a post before it is signed and sent.
	///
	/// JSON bodies are not part of the OAuth 1.0a signature, so fields added here never
	/// change the `Authorization` header.
	fn augment_publish_body(&self, _body: &mut serde_json::Map<String, serde_json::Value>) {}
}

/// Canonical error categories produced by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
	/// Platform refused the consumer credentials, verifier, or access token.
	Auth,
	/// Platform throttled the call.
	RateLimited,
	/// Failure is temporary and may be retried.
	Transient,
}

/// Context passed to platform strategies when classifying failed responses.
///
/// Only primitive data is kept (endpoint, status code, body preview) so strategies stay
/// decoupled from any HTTP client. Transport failures never reach a strategy; they are
/// always transient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorContext {
	/// Endpoint associated with the failing request.
	pub endpoint: EndpointKind,
	/// HTTP status code returned by the platform, when available.
	pub http_status: Option<u16>,
	/// Preview of the response body.
	pub body_preview: Option<String>,
}
impl ErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided endpoint.
	pub fn new(endpoint: EndpointKind) -> Self {
		Self { endpoint, http_status: None, body_preview: None }
	}

	/// Adds an HTTP status code (e.g., 401, 429, 503).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds a truncated preview of the response body.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy shaped around the X/Twitter error surface.
///
/// Status 429 is throttling and 401/403 are credential failures everywhere; any other
/// status on the publish and profile endpoints is transient. Token endpoints answer a
/// rejected verifier or consumer key with a bare client error, so their remaining 4xx
/// statuses are credential failures unless the body says `Rate limit exceeded`.
#[derive(Debug, Default)]
pub struct DefaultPlatformStrategy;
impl Display for DefaultPlatformStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-platform-strategy")
	}
}
impl PlatformStrategy for DefaultPlatformStrategy {
	fn classify_error(&self, ctx: &ErrorContext) -> ErrorClass {
		match ctx.http_status {
			Some(429) => ErrorClass::RateLimited,
			Some(401 | 403) => ErrorClass::Auth,
			Some(code) if ctx.endpoint.is_token_endpoint() && (400..500).contains(&code) =>
				if is_rate_limit_body(ctx.body_preview.as_deref()) {
					ErrorClass::RateLimited
				} else {
					ErrorClass::Auth
				},
			_ => ErrorClass::Transient,
		}
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn is_rate_limit_body(body: Option<&str>) -> bool {
	body.is_some_and(|body| body.to_ascii_lowercase().contains("rate limit exceeded"))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn classify(ctx: ErrorContext) -> ErrorClass {
		DefaultPlatformStrategy.classify_error(&ctx)
	}

	#[test]
	fn status_codes_map_to_classes() {
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::Publish).with_http_status(429)),
			ErrorClass::RateLimited
		);
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::Publish).with_http_status(401)),
			ErrorClass::Auth
		);
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::Profile).with_http_status(403)),
			ErrorClass::Auth
		);
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::Publish).with_http_status(500)),
			ErrorClass::Transient
		);
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::Publish).with_http_status(400)),
			ErrorClass::Transient
		);
	}

	#[test]
	fn token_endpoints_treat_client_errors_as_auth() {
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::AccessToken).with_http_status(400)),
			ErrorClass::Auth
		);
		assert_eq!(
			classify(ErrorContext::new(EndpointKind::RequestToken).with_http_status(503)),
			ErrorClass::Transient
		);
	}

	#[test]
	fn body_hints_only_refine_token_endpoint_client_errors() {
		assert_eq!(
			classify(
				ErrorContext::new(EndpointKind::RequestToken)
					.with_http_status(400)
					.with_body_preview("{\"errors\":[{\"message\":\"Rate limit exceeded\"}]}")
			),
			ErrorClass::RateLimited
		);
		assert_eq!(
			classify(
				ErrorContext::new(EndpointKind::Publish)
					.with_http_status(503)
					.with_body_preview("{\"errors\":[{\"message\":\"Rate limit exceeded\"}]}")
			),
			ErrorClass::Transient
		);
		assert_eq!(
			classify(
				ErrorContext::new(EndpointKind::Profile)
					.with_http_status(400)
					.with_body_preview("{\"errors\":[{\"message\":\"Invalid or expired token\"}]}")
			),
			ErrorClass::Transient
		);
		assert_eq!(
			classify(
				ErrorContext::new(EndpointKind::AccessToken)
					.with_http_status(500)
					.with_body_preview("Could not authenticate you")
			),
			ErrorClass::Transient
		);
	}

	#[test]
	fn previews_are_truncated() {
		let ctx = ErrorContext::new(EndpointKind::Publish).with_body_preview("x".repeat(1_000));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), ErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
