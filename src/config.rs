//! Environment-driven wiring for a publisher.
//!
//! Credentials are read once, here, and passed explicitly from then on; nothing else in the
//! crate consults the environment.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::ConfigError,
	provider::PlatformDescriptor,
	store::{FileStore, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::flows::ReqwestPlatform;

/// Consumer key variable.
pub const ENV_APP_KEY: &str = "TWITTER_APP_KEY";
/// Consumer secret variable.
pub const ENV_APP_SECRET: &str = "TWITTER_APP_SECRET";
/// Optional callback URL variable; `oob` is used when unset.
pub const ENV_CALLBACK_URL: &str = "TWITTER_CALLBACK_URL";
/// Optional token file variable.
pub const ENV_TOKEN_FILE: &str = "TWITTER_TOKEN_FILE";
/// Token file used when [`ENV_TOKEN_FILE`] is unset.
pub const DEFAULT_TOKEN_FILE: &str = "data/twitter_user_tokens.json";

/// Everything needed to wire a publisher for the X/Twitter preset.
#[derive(Clone, Debug)]
pub struct PublisherConfig {
	/// Application consumer credentials.
	pub credentials: Credentials,
	/// Platform descriptor, including the configured callback.
	pub descriptor: PlatformDescriptor,
	/// Location of the persisted token file.
	pub token_path: PathBuf,
}
impl PublisherConfig {
	/// Reads the configuration from process environment variables.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// Blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let consumer_key = read(ENV_APP_KEY).ok_or(ConfigError::MissingEnv { name: ENV_APP_KEY })?;
		let consumer_secret =
			read(ENV_APP_SECRET).ok_or(ConfigError::MissingEnv { name: ENV_APP_SECRET })?;
		let mut descriptor = PlatformDescriptor::twitter().map_err(ConfigError::from)?;

		if let Some(callback) = read(ENV_CALLBACK_URL) {
			Url::parse(&callback)
				.map_err(|source| ConfigError::InvalidUrl { value: callback.clone(), source })?;

			descriptor.quirks.callback = callback;
		}

		let token_path = read(ENV_TOKEN_FILE).unwrap_or_else(|| DEFAULT_TOKEN_FILE.into()).into();

		Ok(Self {
			credentials: Credentials::new(consumer_key, consumer_secret),
			descriptor,
			token_path,
		})
	}

	/// File-backed token store at [`token_path`](Self::token_path).
	pub fn token_store(&self) -> Arc<dyn TokenStore> {
		Arc::new(FileStore::new(self.token_path.clone()))
	}

	/// Wires a reqwest-backed platform with the file store.
	#[cfg(feature = "reqwest")]
	pub fn platform(&self) -> Result<ReqwestPlatform> {
		ReqwestPlatform::new(self.token_store(), self.descriptor.clone(), self.credentials.clone())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect::<HashMap<_, _>>();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn defaults_apply_when_optional_variables_are_unset() {
		let config =
			PublisherConfig::from_lookup(lookup(&[(ENV_APP_KEY, "ck"), (ENV_APP_SECRET, " cs ")]))
				.expect("Config should load.");

		assert_eq!(config.credentials, Credentials::new("ck", "cs"));
		assert_eq!(config.descriptor.quirks.callback, "oob");
		assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_FILE));
	}

	#[test]
	fn optional_variables_override_defaults() {
		let config = PublisherConfig::from_lookup(lookup(&[
			(ENV_APP_KEY, "ck"),
			(ENV_APP_SECRET, "cs"),
			(ENV_CALLBACK_URL, "https://app.example.com/oauth/callback"),
			(ENV_TOKEN_FILE, "/var/lib/publisher/tokens.json"),
		]))
		.expect("Config should load.");

		assert_eq!(config.descriptor.quirks.callback, "https://app.example.com/oauth/callback");
		assert_eq!(config.token_path, PathBuf::from("/var/lib/publisher/tokens.json"));
	}

	#[test]
	fn missing_or_invalid_values_are_config_errors() {
		let err = PublisherConfig::from_lookup(lookup(&[(ENV_APP_KEY, "ck"), (ENV_APP_SECRET, "  ")]))
			.expect_err("Blank secret should be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingEnv { name: ENV_APP_SECRET })
		));

		let err = PublisherConfig::from_lookup(lookup(&[
			(ENV_APP_KEY, "ck"),
			(ENV_APP_SECRET, "cs"),
			(ENV_CALLBACK_URL, "not a url"),
		]))
		.expect_err("Malformed callback should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidUrl { .. })));
	}
}
