//! Signing of whole outbound requests.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenRef},
	http::HttpMethod,
	sign::{
		header::authorization_header,
		nonce::{NonceSource, SystemNonceSource},
		signature::{base_string_uri, sign},
	},
};

/// Signature method advertised in `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Protocol version advertised in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// Unsigned request: method, full URL, form fields, and extra protocol parameters.
///
/// Query pairs on `url` and every `form` field take part in the signature. JSON bodies
/// never do, so a JSON request leaves `form` empty.
#[derive(Clone, Debug)]
pub struct RequestDraft {
	/// HTTP method.
	pub method: HttpMethod,
	/// Target URL, possibly with a query string.
	pub url: Url,
	/// Form-encoded body fields.
	pub form: Vec<(String, String)>,
	/// Flow-specific `oauth_*` parameters such as `oauth_callback` or `oauth_verifier`.
	pub oauth_extra: Vec<(String, String)>,
}
impl RequestDraft {
	/// Starts a draft without form fields or extra protocol parameters.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, form: Vec::new(), oauth_extra: Vec::new() }
	}

	/// Adds a form-encoded body field.
	pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.push((key.into(), value.into()));

		self
	}

	/// Adds a protocol parameter that must travel in the `Authorization` header.
	pub fn with_oauth_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.oauth_extra.push((key.into(), value.into()));

		self
	}
}

/// Outcome of signing a [`RequestDraft`].
#[derive(Clone, Debug)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Base string URI that was signed.
	pub base_url: String,
	/// Every parameter that went into the base string, `oauth_*` included.
	pub params: BTreeMap<String, String>,
	/// Protocol parameters for the header, `oauth_signature` included.
	pub oauth_params: BTreeMap<String, String>,
	/// Base64 HMAC-SHA1 digest.
	pub signature: String,
}
impl SignedRequest {
	/// Renders the `Authorization` header value.
	pub fn authorization_header(&self) -> String {
		authorization_header(&self.oauth_params)
	}
}

/// Signs drafts on behalf of an application, optionally acting for a user token.
pub trait Signer
where
	Self: Send + Sync,
{
	/// Produces a signed request. Each call draws a fresh nonce.
	fn sign(&self, draft: &RequestDraft, token: Option<TokenRef<'_>>) -> SignedRequest;
}

/// HMAC-SHA1 signer bound to one consumer key/secret.
#[derive(Clone)]
pub struct HmacSha1Signer {
	credentials: Credentials,
	nonces: Arc<dyn NonceSource>,
}
impl HmacSha1Signer {
	/// Creates a signer that draws nonces from the system CSPRNG.
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials, nonces: Arc::new(SystemNonceSource) }
	}

	/// Replaces the nonce source, e.g. with a fixed pair to reproduce a known signature.
	pub fn with_nonce_source(mut self, nonces: Arc<dyn NonceSource>) -> Self {
		self.nonces = nonces;

		self
	}

	/// Consumer credentials used by this signer.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}
}
impl Debug for HmacSha1Signer {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("HmacSha1Signer").field("credentials", &self.credentials).finish()
	}
}
impl Signer for HmacSha1Signer {
	fn sign(&self, draft: &RequestDraft, token: Option<TokenRef<'_>>) -> SignedRequest {
		let stamp = self.nonces.next();
		let mut oauth_params = BTreeMap::from([
			("oauth_consumer_key".to_owned(), self.credentials.consumer_key.clone()),
			("oauth_nonce".to_owned(), stamp.nonce),
			("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
			("oauth_timestamp".to_owned(), stamp.timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		]);

		if let Some(token) = token {
			oauth_params.insert("oauth_token".into(), token.token.to_owned());
		}
		for (key, value) in &draft.oauth_extra {
			oauth_params.insert(key.clone(), value.clone());
		}

		let mut params = oauth_params.clone();

		for (key, value) in draft.url.query_pairs() {
			params.insert(key.into_owned(), value.into_owned());
		}
		for (key, value) in &draft.form {
			params.insert(key.clone(), value.clone());
		}

		let base_url = base_string_uri(&draft.url);
		let signature = sign(
			draft.method.as_str(),
			&base_url,
			&params,
			self.credentials.consumer_secret.expose(),
			token.map(|token| token.secret.expose()),
		);

		oauth_params.insert("oauth_signature".into(), signature.clone());

		SignedRequest { method: draft.method, base_url, params, oauth_params, signature }
	}
}
