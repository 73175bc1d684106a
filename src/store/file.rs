//! File-backed [`TokenStore`] holding one JSON token file.

// std
use std::{
	fs::{self, OpenOptions},
	io::{ErrorKind as IoErrorKind, Write},
	path::{Path, PathBuf},
};
// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSecret, UserProfile},
	obs::{self, FlowKind},
	store::{StoreError, StoreFuture, StoredCredentials, TokenStore},
};

/// On-disk layout: `{access_token, access_token_secret, user_info, saved_at}`.
///
/// `user_info` stays untyped until conversion so an unexpected profile shape only drops
/// the profile, not the token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
	access_token: String,
	access_token_secret: TokenSecret,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	user_info: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	saved_at: Option<String>,
}
impl TokenFile {
	fn from_credentials(stored: &StoredCredentials) -> Result<Self, StoreError> {
		let user_info = stored
			.profile
			.as_ref()
			.map(serde_json::to_value)
			.transpose()
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize cached profile: {e}"),
			})?;
		let saved_at = stored
			.saved_at
			.map(|at| at.format(&Rfc3339))
			.transpose()
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to format save timestamp: {e}"),
			})?;

		Ok(Self {
			access_token: stored.access_token.token.clone(),
			access_token_secret: stored.access_token.secret.clone(),
			user_info,
			saved_at,
		})
	}

	fn into_credentials(self) -> Option<StoredCredentials> {
		if self.access_token.is_empty() || self.access_token_secret.is_empty() {
			return None;
		}

		let profile = self.user_info.and_then(|value| serde_json::from_value(value).ok());
		let saved_at =
			self.saved_at.and_then(|raw| OffsetDateTime::parse(raw.trim(), &Rfc3339).ok());

		Some(StoredCredentials {
			access_token: AccessToken::new(self.access_token, self.access_token_secret),
			profile,
			saved_at,
		})
	}
}

/// Persists the connected account's token to a JSON file.
///
/// Every operation holds one mutex for its whole duration, so saves never interleave.
/// Writes go to a sibling temporary file that is synced and then renamed over the target;
/// the token file is never truncated in place. On Unix the file is created with mode
/// `0600`.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	lock: Arc<Mutex<()>>,
}
impl FileStore {
	/// Creates a store at `path`. Nothing touches the disk until the first operation.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), lock: Arc::new(Mutex::new(())) }
	}

	/// Path of the token file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn tmp_path(&self) -> PathBuf {
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		tmp_path
	}

	fn load_locked(&self) -> Option<StoredCredentials> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == IoErrorKind::NotFound => return None,
			Err(e) => {
				obs::warn_degraded(FlowKind::Store, "load", &e);

				return None;
			},
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return None;
		}

		match serde_json::from_slice::<TokenFile>(&bytes) {
			Ok(file) => file.into_credentials(),
			Err(e) => {
				obs::warn_degraded(FlowKind::Store, "load", &e);

				None
			},
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, stored: &StoredCredentials) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(&TokenFile::from_credentials(stored)?)
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token file: {e}"),
			})?;
		let tmp_path = self.tmp_path();

		{
			let mut options = OpenOptions::new();

			options.write(true).create(true).truncate(true);

			#[cfg(unix)]
			{
				use std::os::unix::fs::OpenOptionsExt;

				options.mode(0o600);
			}

			let mut file = options.open(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn clear_locked(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}
}
impl TokenStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<StoredCredentials>> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			Ok(self.load_locked())
		})
	}

	fn save(&self, token: AccessToken, profile: Option<UserProfile>) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			self.persist_locked(&StoredCredentials::new(token, profile))
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			self.clear_locked()
		})
	}

	fn update_profile(&self, token: AccessToken, profile: UserProfile) -> StoreFuture<'_, bool> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			match self.load_locked() {
				Some(stored) if stored.access_token == token => {
					self.persist_locked(&StoredCredentials::new(token, Some(profile)))?;

					Ok(true)
				},
				_ => Ok(false),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tempfile::TempDir;
	// self
	use super::*;

	fn temp_store() -> (TempDir, FileStore) {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
		let store = FileStore::new(dir.path().join("data").join("tokens.json"));

		(dir, store)
	}

	#[tokio::test]
	async fn save_and_reload_round_trip() {
		let (_dir, store) = temp_store();
		let token = AccessToken::new("6253282-abc", "s3cret");
		let profile = UserProfile {
			id: "6253282".into(),
			username: "twitterapi".into(),
			display_name: "Twitter API".into(),
			follower_count: Some(6_000_000),
		};

		store.save(token.clone(), Some(profile.clone())).await.expect("Save should succeed.");

		let reopened = FileStore::new(store.path());
		let loaded = reopened
			.load()
			.await
			.expect("Load should succeed.")
			.expect("Saved credentials should be returned.");

		assert_eq!(loaded.access_token, token);
		assert_eq!(loaded.profile, Some(profile));
		assert!(loaded.saved_at.is_some());
		assert!(!store.tmp_path().exists(), "Temporary file must be renamed away.");

		let raw: serde_json::Value = serde_json::from_slice(
			&fs::read(store.path()).expect("Token file should be readable."),
		)
		.expect("Token file should be JSON.");

		assert_eq!(raw["access_token"], "6253282-abc");
		assert_eq!(raw["access_token_secret"], "s3cret");
		assert_eq!(raw["user_info"]["username"], "twitterapi");
		assert_eq!(raw["user_info"]["followers"], 6_000_000);
	}

	#[tokio::test]
	async fn clear_then_load_returns_none() {
		let (_dir, store) = temp_store();

		store.save(AccessToken::new("tk", "ts"), None).await.expect("Save should succeed.");
		store.clear().await.expect("Clear should succeed.");

		assert_eq!(store.load().await.expect("Load should succeed."), None);
		store.clear().await.expect("Clearing a missing file should succeed.");
	}

	#[tokio::test]
	async fn missing_empty_or_corrupt_files_load_as_none() {
		let (_dir, store) = temp_store();

		assert_eq!(store.load().await.expect("Missing file should load."), None);

		fs::create_dir_all(store.path().parent().expect("Store path should have a parent."))
			.expect("Failed to create data directory.");

		for contents in [
			"",
			"  \n",
			"{\"access_token\": \"tk\"",
			"[1, 2, 3]",
			"{\"access_token\": \"\", \"access_token_secret\": \"\"}",
		] {
			fs::write(store.path(), contents).expect("Failed to write fixture token file.");

			assert_eq!(
				store.load().await.expect("Corrupt files must not raise."),
				None,
				"Contents {contents:?} should degrade to no credentials."
			);
		}
	}

	#[tokio::test]
	async fn legacy_token_files_still_load() {
		let (_dir, store) = temp_store();

		fs::create_dir_all(store.path().parent().expect("Store path should have a parent."))
			.expect("Failed to create data directory.");
		fs::write(
			store.path(),
			r#"{
				"access_token": "tk",
				"access_token_secret": "ts",
				"user_info": {"username": "legacy", "name": "Legacy", "user_id": "7", "following": 3},
				"saved_at": "2024-05-01T09:30:00.123456"
			}"#,
		)
		.expect("Failed to write legacy token file.");

		let loaded = store
			.load()
			.await
			.expect("Load should succeed.")
			.expect("Legacy credentials should be returned.");

		assert_eq!(loaded.access_token, AccessToken::new("tk", "ts"));
		assert_eq!(loaded.profile.map(|profile| profile.id), Some("7".into()));
		assert_eq!(loaded.saved_at, None);
	}

	#[tokio::test]
	async fn profile_updates_only_land_on_the_matching_token() {
		let (_dir, store) = temp_store();
		let current = AccessToken::new("new-tk", "new-ts");
		let profile = UserProfile::from_handle("42", "publisher");

		assert!(
			!store
				.update_profile(current.clone(), profile.clone())
				.await
				.expect("Update on an empty store should succeed."),
			"An empty store must stay empty."
		);
		assert!(!store.path().exists());

		store.save(current.clone(), None).await.expect("Save should succeed.");

		assert!(
			!store
				.update_profile(AccessToken::new("old-tk", "old-ts"), profile.clone())
				.await
				.expect("Update with a stale token should succeed.")
		);
		assert_eq!(
			store.load().await.expect("Load should succeed.").map(|stored| stored.profile),
			Some(None)
		);
		assert!(
			store
				.update_profile(current.clone(), profile.clone())
				.await
				.expect("Update with the current token should succeed.")
		);

		let loaded = store
			.load()
			.await
			.expect("Load should succeed.")
			.expect("Credentials should remain stored.");

		assert_eq!(loaded.access_token, current);
		assert_eq!(loaded.profile, Some(profile));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn token_file_is_owner_only() {
		use std::os::unix::fs::PermissionsExt;

		let (_dir, store) = temp_store();

		store.save(AccessToken::new("tk", "ts"), None).await.expect("Save should succeed.");

		let mode = fs::metadata(store.path())
			.expect("Token file metadata should be readable.")
			.permissions()
			.mode();

		assert_eq!(mode & 0o777, 0o600);
	}
}
