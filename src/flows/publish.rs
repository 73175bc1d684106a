//! Authenticated post publication and profile lookups.
//!
//! [`AuthenticatedPublisher`] picks its mode once, from what the token store holds: a
//! loaded token means live, signed calls; no token means every publish is answered by the
//! [`FallbackSimulator`]. Live failures always surface as typed errors. Only `connect`,
//! `reload`, and `disconnect` change the mode.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, PostId, UserProfile, profile::ProfileEnvelope},
	error::{AuthError, ErrorKind, TransientError, ValidationError},
	flows::{FallbackSimulator, Platform, common},
	http::{HttpMethod, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::EndpointKind,
	sign::RequestDraft,
};

/// Uniform publish outcome, identical in shape for live, simulated, and folded-failure
/// results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishResult {
	/// `true` when the post exists (or was simulated).
	pub success: bool,
	/// Platform-assigned post identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post_id: Option<PostId>,
	/// Canonical post URL.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	/// Author handle used to build `url`, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// `true` when no network call was made.
	pub simulated: bool,
	/// Human-readable failure, for folded results.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Failure classification, for folded results.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_kind: Option<ErrorKind>,
	/// Platform retry hint in whole seconds, for folded throttling failures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub retry_after_secs: Option<i64>,
}
impl PublishResult {
	/// Folds an error into a failed result.
	pub fn failed(error: &Error) -> Self {
		Self {
			success: false,
			post_id: None,
			url: None,
			username: None,
			simulated: false,
			error: Some(error.to_string()),
			error_kind: Some(error.kind()),
			retry_after_secs: error.retry_after().map(|delay| delay.whole_seconds()),
		}
	}

	fn published(post_id: PostId, url: String, username: Option<String>) -> Self {
		Self {
			success: true,
			post_id: Some(post_id),
			url: Some(url),
			username,
			simulated: false,
			error: None,
			error_kind: None,
			retry_after_secs: None,
		}
	}
}

/// Snapshot of the publisher's mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
	/// `true` when a token is loaded and calls are live.
	pub connected: bool,
	/// `true` when publishes are answered by the simulator.
	pub simulated: bool,
	/// Cached handle of the connected account, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
}

#[derive(Clone, Debug)]
struct LiveSession {
	token: AccessToken,
	profile: Option<UserProfile>,
}

#[derive(Clone, Debug)]
enum PublisherMode {
	Live(LiveSession),
	Simulated,
}

/// Publishes posts and reads the connected profile with a stored access token.
pub struct AuthenticatedPublisher<C>
where
	C: ?Sized + HttpTransport,
{
	platform: Platform<C>,
	mode: RwLock<PublisherMode>,
	profile_guard: AsyncMutex<()>,
	simulator: FallbackSimulator,
}
impl<C> AuthenticatedPublisher<C>
where
	C: ?Sized + HttpTransport,
{
	/// Loads the stored token and selects live or simulated mode accordingly.
	///
	/// A store that fails to load is logged and treated as empty, so startup never fails on
	/// a damaged token file.
	pub async fn open(platform: Platform<C>) -> Self {
		let mode = match platform.store.load().await {
			Ok(Some(stored)) => PublisherMode::Live(LiveSession {
				token: stored.access_token,
				profile: stored.profile,
			}),
			Ok(None) => PublisherMode::Simulated,
			Err(e) => {
				obs::warn_degraded(FlowKind::Store, "open", &e);

				PublisherMode::Simulated
			},
		};

		Self::with_mode(platform, mode)
	}

	/// Creates a publisher that always simulates until [`connect`](Self::connect) is called.
	pub fn simulated(platform: Platform<C>) -> Self {
		Self::with_mode(platform, PublisherMode::Simulated)
	}

	fn with_mode(platform: Platform<C>, mode: PublisherMode) -> Self {
		let simulator = FallbackSimulator::new(platform.descriptor.id.clone());

		Self { platform, mode: RwLock::new(mode), profile_guard: AsyncMutex::new(()), simulator }
	}

	/// Shared wiring used by this publisher.
	pub fn platform(&self) -> &Platform<C> {
		&self.platform
	}

	/// Reports whether calls are live and which account is connected.
	pub fn status(&self) -> ConnectionStatus {
		match &*self.mode.read() {
			PublisherMode::Live(session) => ConnectionStatus {
				connected: true,
				simulated: false,
				username: session.profile.as_ref().map(|profile| profile.username.clone()),
			},
			PublisherMode::Simulated =>
				ConnectionStatus { connected: false, simulated: true, username: None },
		}
	}

	/// Switches to live mode with a token obtained from a completed exchange.
	pub fn connect(&self, token: AccessToken, profile: Option<UserProfile>) {
		*self.mode.write() = PublisherMode::Live(LiveSession { token, profile });
	}

	/// Re-reads the token store and selects the mode again.
	pub async fn reload(&self) -> Result<ConnectionStatus> {
		let mode = match self.platform.store.load().await? {
			Some(stored) => PublisherMode::Live(LiveSession {
				token: stored.access_token,
				profile: stored.profile,
			}),
			None => PublisherMode::Simulated,
		};

		*self.mode.write() = mode;

		Ok(self.status())
	}

	/// Deletes the persisted token and switches to simulated mode.
	///
	/// This is the only operation that removes credentials; auth failures never do.
	pub async fn disconnect(&self) -> Result<()> {
		self.platform.store.clear().await?;

		*self.mode.write() = PublisherMode::Simulated;

		Ok(())
	}

	/// Publishes `text` as a new post.
	pub async fn publish(&self, text: &str) -> Result<PublishResult> {
		self.publish_inner(text, None).await
	}

	/// Publishes `text` as a reply to `in_reply_to`.
	pub async fn publish_reply(&self, text: &str, in_reply_to: &PostId) -> Result<PublishResult> {
		self.publish_inner(text, Some(in_reply_to)).await
	}

	/// Publishes `text`, folding any error into a failed [`PublishResult`].
	pub async fn publish_report(&self, text: &str) -> PublishResult {
		match self.publish(text).await {
			Ok(result) => result,
			Err(e) => PublishResult::failed(&e),
		}
	}

	/// Returns the connected profile, fetching it once and caching it afterwards.
	pub async fn get_profile(&self) -> Result<UserProfile> {
		let session = self.live_session()?;

		self.profile_for(session, false).await
	}

	/// Fetches the profile even when one is cached, replacing the cache.
	pub async fn refresh_profile(&self) -> Result<UserProfile> {
		let session = self.live_session()?;

		self.profile_for(session, true).await
	}

	/// Confirms the stored token still works by forcing a signed profile lookup.
	pub async fn verify_credentials(&self) -> Result<UserProfile> {
		self.refresh_profile().await
	}

	async fn publish_inner(
		&self,
		text: &str,
		in_reply_to: Option<&PostId>,
	) -> Result<PublishResult> {
		const KIND: FlowKind = FlowKind::Publish;

		let span = FlowSpan::new(KIND, "publish");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.validate(text)?;

				let session = match &*self.mode.read() {
					PublisherMode::Live(session) => Some(session.clone()),
					PublisherMode::Simulated => None,
				};

				match session {
					Some(session) => self.publish_live(session, text, in_reply_to).await,
					None => Ok(self.simulator.publish()),
				}
			})
			.await;

		match &result {
			Ok(published) if published.simulated => {
				obs::warn_degraded(KIND, "publish", &"no account connected; result simulated");
				obs::record_flow_outcome(KIND, FlowOutcome::Simulated);
			},
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn validate(&self, text: &str) -> Result<()> {
		if text.trim().is_empty() {
			return Err(ValidationError::EmptyText.into());
		}

		let length = text.chars().count();
		let limit = self.platform.descriptor.quirks.max_post_chars;

		if length > limit {
			return Err(ValidationError::TooLong { length, limit }.into());
		}

		Ok(())
	}

	async fn publish_live(
		&self,
		session: LiveSession,
		text: &str,
		in_reply_to: Option<&PostId>,
	) -> Result<PublishResult> {
		let mut body = serde_json::Map::new();

		body.insert("text".into(), text.into());

		if let Some(parent) = in_reply_to {
			body.insert(
				"reply".into(),
				serde_json::json!({ "in_reply_to_tweet_id": parent.to_string() }),
			);
		}

		self.platform.strategy.augment_publish_body(&mut body);

		let json = serde_json::to_vec(&body).map_err(|e| TransientError::UnexpectedResponse {
			endpoint: EndpointKind::Publish,
			message: format!("post body could not be serialized: {e}"),
		})?;
		let endpoints = &self.platform.descriptor.endpoints;
		let draft = RequestDraft::new(HttpMethod::Post, endpoints.publish.clone());
		let response = common::dispatch(
			&self.platform,
			EndpointKind::Publish,
			draft,
			Some(json),
			Some(session.token.as_token_ref()),
		)
		.await?;
		let envelope: PublishEnvelope = common::parse_json(EndpointKind::Publish, &response.body)?;
		let post_id = PostId::new(&envelope.data.id).map_err(|e| {
			TransientError::UnexpectedResponse {
				endpoint: EndpointKind::Publish,
				message: e.to_string(),
			}
		})?;

		match self.profile_for(session, false).await {
			Ok(profile) => {
				let url = endpoints.post_url(&profile.username, &post_id);

				Ok(PublishResult::published(post_id, url, Some(profile.username)))
			},
			Err(e) => {
				obs::warn_degraded(FlowKind::Profile, "publish", &e);

				let url = endpoints.fallback_post_url(&post_id);

				Ok(PublishResult::published(post_id, url, None))
			},
		}
	}

	fn live_session(&self) -> Result<LiveSession> {
		match &*self.mode.read() {
			PublisherMode::Live(session) => Ok(session.clone()),
			PublisherMode::Simulated => Err(AuthError::NotConnected.into()),
		}
	}

	fn cached_profile(&self, token: &AccessToken) -> Option<UserProfile> {
		match &*self.mode.read() {
			PublisherMode::Live(session) if &session.token == token => session.profile.clone(),
			_ => None,
		}
	}

	/// Returns the cached profile, or performs one signed lookup shared by concurrent callers.
	async fn profile_for(&self, session: LiveSession, force: bool) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Profile;

		let LiveSession { token, profile } = session;

		if let Some(profile) = profile.filter(|_| !force) {
			return Ok(profile);
		}

		let span = FlowSpan::new(KIND, "get_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.profile_guard.lock().await;

				if let Some(profile) = self.cached_profile(&token).filter(|_| !force) {
					return Ok(profile);
				}

				let profile = self.fetch_profile(&token).await?;

				let still_live = match &mut *self.mode.write() {
					PublisherMode::Live(current) if current.token == token => {
						current.profile = Some(profile.clone());

						true
					},
					_ => false,
				};

				// A concurrent disconnect or reconnect may have replaced the token meanwhile.
				if still_live {
					match self.platform.store.update_profile(token, profile.clone()).await {
						Ok(true) => {},
						Ok(false) => obs::warn_degraded(
							FlowKind::Store,
							"cache_profile",
							&"stored token changed; profile not persisted",
						),
						Err(e) => obs::warn_degraded(FlowKind::Store, "cache_profile", &e),
					}
				}

				Ok(profile)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
		let descriptor = &self.platform.descriptor;
		let mut url = descriptor.endpoints.profile.clone();

		if !descriptor.quirks.profile_query.is_empty() {
			url.query_pairs_mut().extend_pairs(descriptor.quirks.profile_query.iter());
		}

		let draft = RequestDraft::new(HttpMethod::Get, url);
		let response = common::dispatch(
			&self.platform,
			EndpointKind::Profile,
			draft,
			None,
			Some(token.as_token_ref()),
		)
		.await?;
		let envelope: ProfileEnvelope = common::parse_json(EndpointKind::Profile, &response.body)?;

		Ok(envelope.into())
	}
}
impl<C> Debug for AuthenticatedPublisher<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedPublisher")
			.field("platform", &self.platform.descriptor.id)
			.field("status", &self.status())
			.finish()
	}
}

/// Wire shape of a successful post creation (`{data: {id, text}}`).
#[derive(Debug, Deserialize)]
struct PublishEnvelope {
	data: PublishedPost,
}
#[derive(Debug, Deserialize)]
struct PublishedPost {
	id: String,
}
