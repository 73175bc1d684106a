//! Three-legged OAuth 1.0a token acquisition.
//!
//! [`TokenExchangeClient`] walks `unauthenticated -> request_token_obtained ->
//! access_token_obtained`. Calling an operation from the wrong phase fails with
//! [`AuthError::InvalidState`] before any network call and leaves the phase untouched. A
//! network or platform failure during an attempted exchange drops any request token and
//! resets to `unauthenticated`. One async guard serializes the whole client so two
//! handshakes never race over the same request token.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken, TokenResponse, UserProfile},
	error::{AuthError, ValidationError},
	flows::{Platform, common},
	http::{HttpMethod, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::EndpointKind,
	sign::RequestDraft,
};

/// Public view of the exchange state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangePhase {
	/// No handshake in progress.
	Unauthenticated,
	/// Request token issued; waiting for the user's verifier.
	RequestTokenObtained,
	/// Access token obtained and persisted.
	AccessTokenObtained,
}
impl ExchangePhase {
	/// Returns a stable label suitable for logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangePhase::Unauthenticated => "unauthenticated",
			ExchangePhase::RequestTokenObtained => "request_token_obtained",
			ExchangePhase::AccessTokenObtained => "access_token_obtained",
		}
	}
}
impl Display for ExchangePhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, Default)]
enum ExchangeState {
	#[default]
	Unauthenticated,
	RequestTokenObtained(RequestToken),
	AccessTokenObtained {
		token: AccessToken,
		profile: Option<UserProfile>,
	},
}
impl ExchangeState {
	fn phase(&self) -> ExchangePhase {
		match self {
			ExchangeState::Unauthenticated => ExchangePhase::Unauthenticated,
			ExchangeState::RequestTokenObtained(_) => ExchangePhase::RequestTokenObtained,
			ExchangeState::AccessTokenObtained { .. } => ExchangePhase::AccessTokenObtained,
		}
	}
}

/// Drives the request-token, authorize, access-token handshake for one platform.
pub struct TokenExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	platform: Platform<C>,
	state: Mutex<ExchangeState>,
	guard: AsyncMutex<()>,
}
impl<C> TokenExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client in the `unauthenticated` phase.
	pub fn new(platform: Platform<C>) -> Self {
		Self { platform, state: Mutex::new(ExchangeState::Unauthenticated), guard: AsyncMutex::new(()) }
	}

	/// Current phase of the handshake.
	pub fn phase(&self) -> ExchangePhase {
		self.state.lock().phase()
	}

	/// Access token and profile hint from a completed exchange, if any.
	pub fn access_token(&self) -> Option<(AccessToken, Option<UserProfile>)> {
		match &*self.state.lock() {
			ExchangeState::AccessTokenObtained { token, profile } =>
				Some((token.clone(), profile.clone())),
			_ => None,
		}
	}

	/// Drops any request or access token held in memory and returns to `unauthenticated`.
	///
	/// Persisted credentials are untouched.
	pub fn reset(&self) {
		*self.state.lock() = ExchangeState::Unauthenticated;
	}

	/// Obtains a request token and returns the authorize-page URL for the user to visit.
	///
	/// Valid only while `unauthenticated`.
	pub async fn get_authorization_url(&self) -> Result<Url> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "get_authorization_url");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.guard.lock().await;

				self.ensure_phase(ExchangePhase::Unauthenticated, "request an authorization URL")?;

				let request_token = self.request_token().await?;
				let mut authorize = self.platform.descriptor.endpoints.authorize.clone();

				authorize.query_pairs_mut().append_pair("oauth_token", &request_token.token);

				*self.state.lock() = ExchangeState::RequestTokenObtained(request_token);

				Ok(authorize)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Exchanges the user's verifier for an access token and persists it.
	///
	/// Valid only while `request_token_obtained`. An empty verifier is rejected without
	/// touching the request token; otherwise the request token is consumed whatever the
	/// outcome, and on failure the client returns to `unauthenticated`.
	pub async fn complete_authorization(&self, verifier: &str) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "complete_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.guard.lock().await;
				let verifier = verifier.trim();

				self.ensure_phase(ExchangePhase::RequestTokenObtained, "complete authorization")?;

				if verifier.is_empty() {
					return Err(ValidationError::EmptyVerifier.into());
				}

				let request_token = self.take_request_token()?;

				match self.access_token_for(&request_token, verifier).await {
					Ok((token, profile)) => {
						*self.state.lock() = ExchangeState::AccessTokenObtained {
							token: token.clone(),
							profile,
						};

						Ok(token)
					},
					Err(e) => {
						*self.state.lock() = ExchangeState::Unauthenticated;

						Err(e)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn ensure_phase(&self, expected: ExchangePhase, operation: &'static str) -> Result<()> {
		let phase = self.phase();

		if phase == expected {
			Ok(())
		} else {
			Err(AuthError::InvalidState { operation, phase: phase.as_str() }.into())
		}
	}

	fn take_request_token(&self) -> Result<RequestToken> {
		let mut state = self.state.lock();

		match std::mem::take(&mut *state) {
			ExchangeState::RequestTokenObtained(token) => Ok(token),
			other => {
				let phase = other.phase();

				*state = other;

				Err(AuthError::InvalidState { operation: "complete authorization", phase: phase.as_str() }
					.into())
			},
		}
	}

	async fn request_token(&self) -> Result<RequestToken> {
		let descriptor = &self.platform.descriptor;
		let draft = RequestDraft::new(HttpMethod::Post, descriptor.endpoints.request_token.clone())
			.with_oauth_param("oauth_callback", descriptor.quirks.callback.clone());
		let response =
			common::dispatch(&self.platform, EndpointKind::RequestToken, draft, None, None).await?;

		TokenResponse::parse(EndpointKind::RequestToken, &response.body)?.into_request_token()
	}

	async fn access_token_for(
		&self,
		request_token: &RequestToken,
		verifier: &str,
	) -> Result<(AccessToken, Option<UserProfile>)> {
		let draft =
			RequestDraft::new(HttpMethod::Post, self.platform.descriptor.endpoints.access_token.clone())
				.with_oauth_param("oauth_verifier", verifier);
		let response = common::dispatch(
			&self.platform,
			EndpointKind::AccessToken,
			draft,
			None,
			Some(request_token.as_token_ref()),
		)
		.await?;
		let (token, profile) =
			TokenResponse::parse(EndpointKind::AccessToken, &response.body)?.into_access_token();

		self.platform.store.save(token.clone(), profile.clone()).await?;

		Ok((token, profile))
	}
}
impl<C> Debug for TokenExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeClient")
			.field("platform", &self.platform.descriptor.id)
			.field("phase", &self.phase())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn phase_labels_are_stable() {
		assert_eq!(ExchangePhase::Unauthenticated.to_string(), "unauthenticated");
		assert_eq!(ExchangePhase::RequestTokenObtained.as_str(), "request_token_obtained");
		assert_eq!(
			serde_json::to_string(&ExchangePhase::AccessTokenObtained)
				.expect("Phase should serialize to JSON."),
			"\"access_token_obtained\""
		);
	}
}
