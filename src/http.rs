//! Transport primitives for signed platform calls.
//!
//! Flows build an [`OutboundRequest`] that already carries its `Authorization` header and
//! hand it to an [`HttpTransport`]. Implementations return the raw status, retry hint, and
//! body; classification into publisher errors happens above this layer, so a custom
//! transport only has to move bytes.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<InboundResponse, TransportError>> + 'a + Send>>;

/// HTTP methods used by the OAuth 1.0a endpoints and the publish/profile APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Upper-case method token as it appears in the signature base string.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request body variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	Empty,
	/// Pre-encoded `application/x-www-form-urlencoded` body.
	Form(String),
	/// Serialized `application/json` body.
	Json(Vec<u8>),
}

/// Fully signed request ready for dispatch.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Target URL including any query string.
	pub url: Url,
	/// `Authorization` header value (`OAuth ...`).
	pub authorization: String,
	/// Request body.
	pub body: RequestBody,
}

/// Status code and retry hint captured from a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Response returned by a transport, successful or not.
#[derive(Clone, Debug)]
pub struct InboundResponse {
	/// Status and retry hint.
	pub metadata: ResponseMetadata,
	/// Response body decoded as text.
	pub body: String,
}

/// Abstraction over HTTP stacks capable of executing signed requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// the exchange client and the publisher. Non-2xx responses are returned as
/// [`InboundResponse`] values; only failures that produce no response at all map to
/// [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the raw response.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Signed requests must not follow redirects: a redirect would replay the signature against
/// a different URL. Configure any custom [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a client with the given request timeout and redirects disabled.
	pub fn new(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let OutboundRequest { method, url, authorization, body } = request;
			let builder = match method {
				HttpMethod::Get => self.0.get(url),
				HttpMethod::Post => self.0.post(url),
			}
			.header(AUTHORIZATION, authorization);
			let builder = match body {
				RequestBody::Empty => builder,
				RequestBody::Form(form) =>
					builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded").body(form),
				RequestBody::Json(json) => builder.header(CONTENT_TYPE, "application/json").body(json),
			};
			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.text().await?;

			Ok(InboundResponse { metadata: ResponseMetadata { status, retry_after }, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
