//! Storage contract and built-in store implementations for the connected account's token.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserProfile},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the single long-lived access token of a publisher.
///
/// Implementations serialize their own reads and writes: two concurrent `save` calls must
/// never interleave. `load` degrades to `Ok(None)` for missing or unreadable data so callers
/// can treat it exactly like a fresh, never-connected install.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the persisted credentials, or `None` when nothing usable is stored.
	fn load(&self) -> StoreFuture<'_, Option<StoredCredentials>>;

	/// Replaces the persisted token and cached profile.
	fn save(&self, token: AccessToken, profile: Option<UserProfile>) -> StoreFuture<'_, ()>;

	/// Removes the persisted token. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;

	/// Replaces the cached profile only while `token` is still the persisted token.
	///
	/// The comparison and the write happen under the same serialization as `save` and
	/// `clear`. Returns `false`, leaving the store untouched, when the store is empty or
	/// holds a different token.
	fn update_profile(&self, token: AccessToken, profile: UserProfile) -> StoreFuture<'_, bool>;
}

/// Token plus cached profile as last persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredCredentials {
	/// Long-lived access token.
	pub access_token: AccessToken,
	/// Profile cached alongside the token, if any.
	pub profile: Option<UserProfile>,
	/// Time of the last save, when known.
	pub saved_at: Option<OffsetDateTime>,
}
impl StoredCredentials {
	/// Stamps freshly obtained credentials with the current time.
	pub fn new(access_token: AccessToken, profile: Option<UserProfile>) -> Self {
		Self { access_token, profile, saved_at: Some(OffsetDateTime::now_utc()) }
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_publisher_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Publisher error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn fresh_credentials_are_timestamped() {
		let stored = StoredCredentials::new(AccessToken::new("tk", "ts"), None);

		assert!(stored.saved_at.is_some());
	}
}
