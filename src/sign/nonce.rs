//! Fresh `oauth_nonce` + `oauth_timestamp` pairs.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::_prelude::*;

/// Random bytes drawn per nonce (256 bits).
pub const NONCE_BYTES: usize = 32;

/// Nonce and Unix-seconds timestamp embedded in one signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceStamp {
	/// Single-use, URL-safe nonce.
	pub nonce: String,
	/// Unix timestamp in seconds.
	pub timestamp: i64,
}

/// Source of nonce/timestamp pairs; must be safe to call from concurrent tasks.
pub trait NonceSource
where
	Self: Send + Sync,
{
	/// Returns a pair for the next request.
	fn next(&self) -> NonceStamp;
}

/// Draws nonces from the thread-local CSPRNG and stamps the current UTC time.
///
/// Uniqueness relies on entropy alone; no counter is shared between callers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemNonceSource;
impl NonceSource for SystemNonceSource {
	fn next(&self) -> NonceStamp {
		let mut bytes = [0_u8; NONCE_BYTES];

		rand::rng().fill_bytes(&mut bytes);

		NonceStamp {
			nonce: URL_SAFE_NO_PAD.encode(bytes),
			timestamp: OffsetDateTime::now_utc().unix_timestamp(),
		}
	}
}

/// Replays one caller-supplied pair; only for reproducing fixed signature vectors.
#[derive(Clone, Debug)]
pub struct FixedNonceSource(NonceStamp);
impl FixedNonceSource {
	/// Creates a source that always returns `nonce` and `timestamp`.
	pub fn new(nonce: impl Into<String>, timestamp: i64) -> Self {
		Self(NonceStamp { nonce: nonce.into(), timestamp })
	}
}
impl NonceSource for FixedNonceSource {
	fn next(&self) -> NonceStamp {
		self.0.clone()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{collections::HashSet, thread};
	// self
	use super::*;

	#[test]
	fn nonces_are_url_safe_and_carry_256_bits() {
		let stamp = SystemNonceSource.next();

		// 32 bytes -> 43 unpadded base64 characters.
		assert_eq!(stamp.nonce.len(), 43);
		assert!(
			stamp.nonce.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
			"Nonce must stay inside the unreserved set: {}",
			stamp.nonce
		);
		assert!((OffsetDateTime::now_utc().unix_timestamp() - stamp.timestamp).abs() <= 5);
	}

	#[test]
	fn concurrent_callers_never_collide() {
		let source = Arc::new(SystemNonceSource);
		let handles = (0..8)
			.map(|_| {
				let source = source.clone();

				thread::spawn(move || (0..250).map(|_| source.next().nonce).collect::<Vec<_>>())
			})
			.collect::<Vec<_>>();
		let mut seen = HashSet::new();

		for handle in handles {
			for nonce in handle.join().expect("Nonce worker thread should not panic.") {
				assert!(seen.insert(nonce), "Nonce repeated across concurrent callers.");
			}
		}

		assert_eq!(seen.len(), 2_000);
	}

	#[test]
	fn fixed_source_replays_its_pair() {
		let source = FixedNonceSource::new("abc123", 1_318_622_958);

		assert_eq!(source.next(), source.next());
		assert_eq!(source.next().timestamp, 1_318_622_958);
	}
}
