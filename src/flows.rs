//! High-level flow orchestrators built on the shared [`Platform`] wiring.
//!
//! `exchange` drives the three-legged OAuth 1.0a handshake, `publish` signs post and
//! profile calls with the stored access token, and `simulate` answers publishes when no
//! account is connected. `common` holds the dispatch + error-mapping path all of them use.

mod common;
pub mod exchange;
pub mod publish;
pub mod simulate;

pub use exchange::*;
pub use publish::*;
pub use simulate::*;

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	http::HttpTransport,
	provider::{DefaultPlatformStrategy, PlatformDescriptor, PlatformStrategy},
	sign::{HmacSha1Signer, Signer},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Platform specialized for the crate's default reqwest transport.
pub type ReqwestPlatform = Platform<ReqwestTransport>;

/// Everything a flow needs to talk to one platform, passed explicitly.
///
/// The platform owns the HTTP transport, token store, descriptor, strategy, and signer
/// references so individual flows can focus on their own state. Cloning is cheap: every
/// collaborator sits behind an [`Arc`].
pub struct Platform<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound platform request.
	pub http: Arc<C>,
	/// Store that persists the connected account's token.
	pub store: Arc<dyn TokenStore>,
	/// Descriptor that defines endpoints and quirks.
	pub descriptor: PlatformDescriptor,
	/// Strategy responsible for error classification and publish-body tweaks.
	pub strategy: Arc<dyn PlatformStrategy>,
	/// Signer bound to the application's consumer credentials.
	pub signer: Arc<dyn Signer>,
}
impl<C> Platform<C>
where
	C: ?Sized + HttpTransport,
{
	/// Wires a platform around a caller-provided transport with the default strategy and
	/// an HMAC-SHA1 signer for `credentials`.
	pub fn with_transport(
		store: Arc<dyn TokenStore>,
		descriptor: PlatformDescriptor,
		credentials: Credentials,
		http: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http: http.into(),
			store,
			descriptor,
			strategy: Arc::new(DefaultPlatformStrategy),
			signer: Arc::new(HmacSha1Signer::new(credentials)),
		}
	}

	/// Replaces the error-classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn PlatformStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the signer, e.g. with one using a fixed nonce source.
	pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
		self.signer = signer;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Platform<ReqwestTransport> {
	/// Creates a platform with its own reqwest transport honoring the descriptor's timeout.
	pub fn new(
		store: Arc<dyn TokenStore>,
		descriptor: PlatformDescriptor,
		credentials: Credentials,
	) -> Result<Self> {
		let http = ReqwestTransport::new(descriptor.request_timeout)?;

		Ok(Self::with_transport(store, descriptor, credentials, http))
	}
}
impl<C> Clone for Platform<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http: self.http.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			strategy: self.strategy.clone(),
			signer: self.signer.clone(),
		}
	}
}
impl<C> Debug for Platform<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Platform").field("descriptor", &self.descriptor).finish_non_exhaustive()
	}
}
