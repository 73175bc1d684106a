//! Pure HMAC-SHA1 signature computation.
//!
//! Every function here is deterministic: the nonce and timestamp arrive as ordinary
//! parameters, so fixed inputs always produce the same signature. Parameters with
//! repeated keys are not supported; callers pass one value per key.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{_prelude::*, sign::encode::percent_encode};

type HmacSha1 = Hmac<Sha1>;

/// Computes `base64(HMAC-SHA1(signing_key, base_string))` for a request.
///
/// `base_url` must exclude the query string; `params` must hold every query/body parameter
/// and every `oauth_*` parameter except `oauth_signature`. An absent token secret signs as
/// the empty string.
pub fn sign<I, K, V>(
	method: &str,
	base_url: &str,
	params: I,
	consumer_secret: &str,
	token_secret: Option<&str>,
) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let base = base_string(method, base_url, params);
	let key = signing_key(consumer_secret, token_secret);

	hmac_sha1_base64(&key, &base)
}

/// Encodes, sorts, and joins `params` into the normalized parameter string.
///
/// Pairs sort byte-wise by encoded key, then by encoded value.
pub fn normalize_parameters<I, K, V>(params: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| {
			(percent_encode(key.as_ref()).into_owned(), percent_encode(value.as_ref()).into_owned())
		})
		.collect::<Vec<_>>();

	encoded.sort();

	encoded.into_iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
}

/// Builds `UPPER(method)&enc(base_url)&enc(parameter_string)`.
pub fn base_string<I, K, V>(method: &str, base_url: &str, params: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let normalized = normalize_parameters(params);

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(base_url),
		percent_encode(&normalized)
	)
}

/// Builds `enc(consumer_secret)&enc(token_secret_or_empty)`.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret.unwrap_or("")))
}

/// Returns the base string URI of `url`: scheme, host, non-default port, and path.
///
/// Query and fragment are dropped; `url` already lowercases the scheme and host and omits
/// default ports.
pub fn base_string_uri(url: &Url) -> String {
	let mut base = url.clone();

	base.set_query(None);
	base.set_fragment(None);

	base.to_string()
}

fn hmac_sha1_base64(key: &str, data: &str) -> String {
	let Ok(mut mac) = HmacSha1::new_from_slice(key.as_bytes()) else {
		unreachable!("HMAC accepts keys of any length");
	};

	mac.update(data.as_bytes());

	STANDARD.encode(mac.finalize().into_bytes())
}
