//! RFC 3986 percent-encoding used by signature base strings and form bodies.

// std
use std::borrow::Cow;
// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved set (`A-Z a-z 0-9 - . _ ~`).
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `input` as RFC 5849 §3.6 requires.
///
/// Input is treated as UTF-8; every byte outside the unreserved set becomes `%XX` with
/// uppercase hex. Space is always `%20`, never `+`.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
	utf8_percent_encode(input, OAUTH_ENCODE_SET).into()
}

/// Encodes `pairs` as an `application/x-www-form-urlencoded` body using the signing encoder.
pub(crate) fn encode_form<'a, I>(pairs: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	pairs
		.into_iter()
		.map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>()
		.join("&")
}
