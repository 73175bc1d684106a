//! Shared helpers for flow implementations: signed dispatch, error mapping, JSON parsing.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenRef,
	error::{AuthError, TransientError},
	flows::Platform,
	http::{HttpTransport, InboundResponse, OutboundRequest, RequestBody},
	provider::{EndpointKind, ErrorClass, ErrorContext, PlatformStrategy},
	sign::{RequestDraft, encode::encode_form},
};

/// Signs `draft`, sends it, and returns the response when the status is 2xx.
///
/// Form fields travel as the body and take part in the signature; a `json` body never
/// does. Non-2xx responses are classified by the platform strategy.
pub(crate) async fn dispatch<C>(
	platform: &Platform<C>,
	endpoint: EndpointKind,
	draft: RequestDraft,
	json: Option<Vec<u8>>,
	token: Option<TokenRef<'_>>,
) -> Result<InboundResponse>
where
	C: ?Sized + HttpTransport,
{
	let signed = platform.signer.sign(&draft, token);
	let body = match json {
		Some(json) => RequestBody::Json(json),
		None if draft.form.is_empty() => RequestBody::Empty,
		None => RequestBody::Form(encode_form(
			draft.form.iter().map(|(key, value)| (key.as_str(), value.as_str())),
		)),
	};
	let request = OutboundRequest {
		method: draft.method,
		url: draft.url,
		authorization: signed.authorization_header(),
		body,
	};
	let response = platform.http.execute(request).await?;

	if response.metadata.is_success() {
		Ok(response)
	} else {
		Err(map_status_error(platform.strategy.as_ref(), endpoint, response))
	}
}

/// Maps a non-2xx response into the publisher taxonomy.
pub(crate) fn map_status_error(
	strategy: &dyn PlatformStrategy,
	endpoint: EndpointKind,
	response: InboundResponse,
) -> Error {
	let InboundResponse { metadata, body } = response;
	let ctx = ErrorContext::new(endpoint)
		.with_http_status(metadata.status)
		.with_body_preview(body.trim());
	let preview = ctx.body_preview.clone().unwrap_or_default();
	let reason = if preview.is_empty() { format!("HTTP {}", metadata.status) } else { preview };

	match strategy.classify_error(&ctx) {
		ErrorClass::Auth =>
			AuthError::Rejected { endpoint, status: Some(metadata.status), reason }.into(),
		ErrorClass::RateLimited =>
			Error::RateLimited { endpoint, retry_after: metadata.retry_after, message: reason },
		ErrorClass::Transient => TransientError::Status {
			endpoint,
			status: metadata.status,
			body,
			retry_after: metadata.retry_after,
		}
		.into(),
	}
}

/// Parses a JSON body, recording the failing path on error.
pub(crate) fn parse_json<T>(endpoint: EndpointKind, body: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransientError::MalformedResponse { endpoint, source }.into())
}
