//! Publisher-level error types shared across signing, flows, and stores.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input rejected before any network call; never retried.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Credentials are missing, misused, or refused by the platform.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Platform throttled the call; retry after the hinted delay.
	#[error("The {endpoint} endpoint is rate limited: {message}.")]
	RateLimited {
		/// Endpoint that returned the throttling response.
		endpoint: EndpointKind,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Body preview returned with the throttling response.
		message: String,
	},
	/// Temporary upstream or network failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns the stable classification label for the error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Validation(_) => ErrorKind::Validation,
			Self::Auth(_) => ErrorKind::Auth,
			Self::RateLimited { .. } => ErrorKind::RateLimited,
			Self::Transient(_) => ErrorKind::Transient,
			Self::Storage(_) => ErrorKind::Storage,
			Self::Config(_) => ErrorKind::Config,
		}
	}

	/// Returns `true` when a caller-driven retry may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self.kind(), ErrorKind::RateLimited | ErrorKind::Transient)
	}

	/// Provider-supplied retry hint, when the failure carries one.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::RateLimited { retry_after, .. } => *retry_after,
			Self::Transient(TransientError::Status { retry_after, .. }) => *retry_after,
			_ => None,
		}
	}
}

/// Serializable error classification handed to scheduling collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// See [`Error::Validation`].
	Validation,
	/// See [`Error::Auth`].
	Auth,
	/// See [`Error::RateLimited`].
	RateLimited,
	/// See [`Error::Transient`].
	Transient,
	/// See [`Error::Storage`].
	Storage,
	/// See [`Error::Config`].
	Config,
}
impl ErrorKind {
	/// Returns a stable label suitable for logs or persisted records.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Validation => "validation",
			Self::Auth => "auth",
			Self::RateLimited => "rate_limited",
			Self::Transient => "transient",
			Self::Storage => "storage",
			Self::Config => "config",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Input rejected before the platform is contacted.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Post text is empty or whitespace only.
	#[error("Post text cannot be empty.")]
	EmptyText,
	/// Post text exceeds the platform limit.
	#[error("Post text is {length} characters long; the limit is {limit}.")]
	TooLong {
		/// Character count of the rejected text.
		length: usize,
		/// Platform limit in characters.
		limit: usize,
	},
	/// Authorization verifier is empty.
	#[error("OAuth verifier cannot be empty.")]
	EmptyVerifier,
}

/// Credential failures. Never retried or cleared automatically.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthError {
	/// No access token has ever been obtained or loaded.
	#[error("No account is connected; complete the authorization flow first.")]
	NotConnected,
	/// Operation is not valid in the current exchange phase.
	#[error("Cannot {operation} while the exchange is {phase}.")]
	InvalidState {
		/// Rejected operation label.
		operation: &'static str,
		/// Phase label at the time of the call.
		phase: &'static str,
	},
	/// Platform refused the consumer credentials, verifier, or access token.
	#[error("The {endpoint} endpoint rejected the credentials: {reason}.")]
	Rejected {
		/// Endpoint that rejected the call.
		endpoint: EndpointKind,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Body preview or summary of the rejection.
		reason: String,
	},
	/// Request-token response did not confirm the callback.
	#[error("The platform did not confirm the OAuth callback.")]
	CallbackNotConfirmed,
}

/// Configuration and validation failures raised while wiring the publisher.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Platform descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::DescriptorError),
	/// An endpoint or callback URL cannot be parsed.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Required environment variable is missing or blank.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Platform answered with a non-success status that is neither auth nor throttling.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	Status {
		/// Endpoint that failed.
		endpoint: EndpointKind,
		/// HTTP status code.
		status: u16,
		/// Raw response body kept for diagnostics.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Platform responded with JSON that does not match the expected shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Endpoint that returned the payload.
		endpoint: EndpointKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Platform responded successfully but omitted required fields.
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Endpoint that returned the payload.
		endpoint: EndpointKind,
		/// Summary of what was missing.
		message: String,
	},
	/// Transport-level failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		Self::Transient(e.into())
	}
}

/// Failures that produced no HTTP response at all.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
