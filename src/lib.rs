//! OAuth 1.0a publishing in one crate: RFC 5849 HMAC-SHA1 request signing, the three-legged
//! token exchange, atomic token storage, and an authenticated publish/profile client that
//! falls back to simulation when no account is connected.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod sign;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// crates.io
	use reqwest::redirect::Policy;
	// self
	use crate::{
		auth::{Credentials, PlatformId},
		flows::ReqwestPlatform,
		http::ReqwestTransport,
		provider::{PlatformDescriptor, PlatformQuirks},
		store::{MemoryStore, TokenStore},
	};

	/// Consumer key used by test platforms.
	pub const TEST_CONSUMER_KEY: &str = "test-consumer-key";
	/// Consumer secret used by test platforms.
	pub const TEST_CONSUMER_SECRET: &str = "test-consumer-secret";

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport(timeout: StdDuration) -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(Policy::none())
			.timeout(timeout)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Descriptor whose endpoints all live under `base_url` (typically a mock server).
	pub fn test_descriptor(base_url: &str) -> PlatformDescriptor {
		let url = |path: &str| {
			Url::parse(&format!("{base_url}{path}")).expect("Mock endpoint URL should parse.")
		};

		PlatformDescriptor::builder(PlatformId::new("mock").expect("Fixture id should be valid."))
			.request_token_endpoint(url("/oauth/request_token"))
			.authorize_endpoint(url("/oauth/authorize"))
			.access_token_endpoint(url("/oauth/access_token"))
			.publish_endpoint(url("/2/tweets"))
			.profile_endpoint(url("/2/users/me"))
			.post_url_base(url("/"))
			.quirks(PlatformQuirks {
				profile_query: vec![("user.fields".into(), "public_metrics".into())],
				..PlatformQuirks::default()
			})
			.build()
			.expect("Mock descriptor should validate.")
	}

	/// Credentials shared by every test platform.
	pub fn test_credentials() -> Credentials {
		Credentials::new(TEST_CONSUMER_KEY, TEST_CONSUMER_SECRET)
	}

	/// Constructs a reqwest-backed [`ReqwestPlatform`] over an in-memory store, honoring the
	/// descriptor's request timeout.
	pub fn build_reqwest_test_platform(
		descriptor: PlatformDescriptor,
	) -> (ReqwestPlatform, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let transport = test_reqwest_transport(descriptor.request_timeout);
		let platform =
			ReqwestPlatform::with_transport(store, descriptor, test_credentials(), transport);

		(platform, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
