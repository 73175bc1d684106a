//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserProfile},
	store::{StoreFuture, StoredCredentials, TokenStore},
};

type StoreSlot = Arc<RwLock<Option<StoredCredentials>>>;

/// Storage backend that keeps the token in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	/// Creates a store pre-seeded with `token`.
	pub fn with_token(token: AccessToken, profile: Option<UserProfile>) -> Self {
		Self(Arc::new(RwLock::new(Some(StoredCredentials::new(token, profile)))))
	}

	/// Returns the current contents without going through the async contract.
	pub fn snapshot(&self) -> Option<StoredCredentials> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<StoredCredentials>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, token: AccessToken, profile: Option<UserProfile>) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(StoredCredentials::new(token, profile));

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}

	fn update_profile(&self, token: AccessToken, profile: UserProfile) -> StoreFuture<'_, bool> {
		let slot = self.0.clone();

		Box::pin(async move {
			let mut current = slot.write();

			match current.as_ref() {
				Some(stored) if stored.access_token == token => {
					*current = Some(StoredCredentials::new(token, Some(profile)));

					Ok(true)
				},
				_ => Ok(false),
			}
		})
	}
}
