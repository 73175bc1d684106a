//! `Authorization: OAuth ...` header rendering.

// self
use crate::sign::encode::percent_encode;

/// Renders `OAuth key="value", ...` from signed protocol parameters.
///
/// Only `oauth_*` keys are emitted, sorted lexicographically, with values percent-encoded.
/// Other parameters that took part in signing travel in the query string or body instead.
pub fn authorization_header<I, K, V>(oauth_params: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut pairs = oauth_params
		.into_iter()
		.filter(|(key, _)| key.as_ref().starts_with("oauth_"))
		.map(|(key, value)| {
			format!("{}=\"{}\"", percent_encode(key.as_ref()), percent_encode(value.as_ref()))
		})
		.collect::<Vec<_>>();

	pairs.sort();

	format!("OAuth {}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn header_sorts_encodes_and_filters() {
		let header = authorization_header([
			("oauth_token", "tk"),
			("status", "Hello Ljubljana"),
			("oauth_signature", "s4cm7qokDeD8IT4MurVHLB0AaFI="),
			("oauth_consumer_key", "ck"),
			("oauth_callback", "http://localhost:8000/cb"),
		]);

		assert_eq!(
			header,
			"OAuth oauth_callback=\"http%3A%2F%2Flocalhost%3A8000%2Fcb\", oauth_consumer_key=\"ck\", oauth_signature=\"s4cm7qokDeD8IT4MurVHLB0AaFI%3D\", oauth_token=\"tk\""
		);
	}
}
