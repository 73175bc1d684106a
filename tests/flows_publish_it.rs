// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use oauth1_publisher::{
	_preludet::*,
	auth::{AccessToken, UserProfile},
	error::{AuthError, ErrorKind, TransientError, TransportError, ValidationError},
	flows::AuthenticatedPublisher,
	http::ReqwestTransport,
	provider::{EndpointKind, PlatformDescriptor},
	store::{MemoryStore, TokenStore},
};

const POST_ID: &str = "1445880548472328192";
const PUBLISH_BODY: &str = "{\"data\":{\"id\":\"1445880548472328192\",\"text\":\"Hello\"}}";
const PROFILE_BODY: &str = "{\"data\":{\"id\":\"42\",\"username\":\"fresh\",\"name\":\"Fresh Account\",\"public_metrics\":{\"followers_count\":12}}}";

fn access_token() -> AccessToken {
	AccessToken::new("42-acc-token", "acc-secret")
}

async fn live_publisher(
	server: &MockServer,
	profile: Option<UserProfile>,
) -> (AuthenticatedPublisher<ReqwestTransport>, Arc<MemoryStore>) {
	live_publisher_with(test_descriptor(&server.base_url()), profile).await
}

async fn live_publisher_with(
	descriptor: PlatformDescriptor,
	profile: Option<UserProfile>,
) -> (AuthenticatedPublisher<ReqwestTransport>, Arc<MemoryStore>) {
	let (platform, store) = build_reqwest_test_platform(descriptor);

	store.save(access_token(), profile).await.expect("Seeding the store should succeed.");

	let publisher = AuthenticatedPublisher::open(platform).await;

	assert!(publisher.status().connected);

	(publisher, store)
}

#[tokio::test]
async fn live_publish_builds_canonical_url_from_cached_profile() {
	let server = MockServer::start_async().await;
	let (publisher, _store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;
	let publish_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets").header_exists("authorization");
			then.status(201).header("content-type", "application/json").body(PUBLISH_BODY);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/me");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;
	let result = publisher.publish("Hello").await.expect("Publish should succeed.");

	assert!(result.success);
	assert!(!result.simulated);
	assert_eq!(result.post_id.as_deref(), Some(POST_ID));
	assert_eq!(result.username.as_deref(), Some("publisher"));
	assert_eq!(result.url, Some(format!("{}/publisher/status/{POST_ID}", server.base_url())));

	publish_mock.assert_calls_async(1).await;
	profile_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_profile_is_fetched_once_and_persisted() {
	let server = MockServer::start_async().await;
	let (publisher, store) = live_publisher(&server, None).await;
	let publish_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(201).header("content-type", "application/json").body(PUBLISH_BODY);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/me").query_param("user.fields", "public_metrics");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;
	let first = publisher.publish("First").await.expect("First publish should succeed.");
	let second = publisher.publish("Second").await.expect("Second publish should succeed.");

	assert_eq!(first.url, Some(format!("{}/fresh/status/{POST_ID}", server.base_url())));
	assert_eq!(second.username.as_deref(), Some("fresh"));
	assert_eq!(publisher.status().username.as_deref(), Some("fresh"));

	let stored = store.snapshot().expect("Token should remain stored.");
	let profile = stored.profile.expect("Fetched profile should be persisted.");

	assert_eq!(stored.access_token, access_token());
	assert_eq!(profile.display_name, "Fresh Account");
	assert_eq!(profile.follower_count, Some(12));

	publish_mock.assert_calls_async(2).await;
	profile_mock.assert_calls_async(1).await;

	let refreshed = publisher.refresh_profile().await.expect("Forced refresh should succeed.");

	assert_eq!(refreshed.username, "fresh");

	profile_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn profile_failure_falls_back_to_handle_free_url() {
	let server = MockServer::start_async().await;
	let (publisher, _store) = live_publisher(&server, None).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(201).header("content-type", "application/json").body(PUBLISH_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/me");
			then.status(503).body("Service Unavailable");
		})
		.await;

	let result = publisher.publish("Hello").await.expect("Post creation itself succeeded.");

	assert!(result.success);
	assert!(result.username.is_none());
	assert_eq!(result.url, Some(format!("{}/i/status/{POST_ID}", server.base_url())));
}

#[tokio::test]
async fn throttling_surfaces_retry_hint() {
	let server = MockServer::start_async().await;
	let (publisher, _store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(429).header("retry-after", "900").body("Too Many Requests");
		})
		.await;
	let err = publisher.publish("Hello").await.expect_err("Throttled publish must fail.");

	assert!(matches!(
		err,
		Error::RateLimited { endpoint: EndpointKind::Publish, retry_after: Some(delay), .. }
			if delay == Duration::seconds(900)
	));
	assert!(err.is_retryable());

	let report = publisher.publish_report("Hello").await;

	assert!(!report.success);
	assert!(!report.simulated);
	assert_eq!(report.error_kind, Some(ErrorKind::RateLimited));
	assert_eq!(report.retry_after_secs, Some(900));

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_token_is_reported_but_kept() {
	let server = MockServer::start_async().await;
	let (publisher, store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"title\":\"Unauthorized\",\"detail\":\"Unauthorized\",\"status\":401}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/me");
			then.status(401).body("Invalid or expired token.");
		})
		.await;

	let err = publisher.publish("Hello").await.expect_err("Rejected token must fail.");

	assert!(matches!(
		err,
		Error::Auth(AuthError::Rejected { endpoint: EndpointKind::Publish, status: Some(401), .. })
	));
	assert!(!err.is_retryable());

	let err = publisher.verify_credentials().await.expect_err("Verification must fail.");

	assert!(matches!(
		err,
		Error::Auth(AuthError::Rejected { endpoint: EndpointKind::Profile, .. })
	));
	assert!(publisher.status().connected);
	assert_eq!(store.snapshot().map(|stored| stored.access_token), Some(access_token()));
}

#[tokio::test]
async fn server_errors_are_transient_with_body() {
	let server = MockServer::start_async().await;
	let (publisher, _store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(500).body("upstream exploded");
		})
		.await;

	let err = publisher.publish("Hello").await.expect_err("Server error must fail.");

	match err {
		Error::Transient(TransientError::Status { endpoint, status, body, .. }) => {
			assert_eq!(endpoint, EndpointKind::Publish);
			assert_eq!(status, 500);
			assert_eq!(body, "upstream exploded");
		},
		other => panic!("Expected a transient status error, got {other:?}."),
	}

	assert_eq!(publisher.publish_report("Hello").await.error_kind, Some(ErrorKind::Transient));
}

#[tokio::test]
async fn publish_failures_are_classified_by_status_alone() {
	let cases = [
		(503, "{\"errors\":[{\"message\":\"Rate limit exceeded\"}]}"),
		(500, "Could not authenticate you"),
		(400, "{\"errors\":[{\"message\":\"Invalid or expired token\"}]}"),
	];

	for (status, body) in cases {
		let server = MockServer::start_async().await;
		let (publisher, _store) =
			live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;

		server
			.mock_async(|when, then| {
				when.method(POST).path("/2/tweets");
				then.status(status).body(body);
			})
			.await;

		let err = publisher.publish("Hello").await.expect_err("Failed publish must error.");

		assert!(
			matches!(
				&err,
				Error::Transient(TransientError::Status {
					endpoint: EndpointKind::Publish,
					status: s,
					body: b,
					..
				}) if *s == status && b == body
			),
			"HTTP {status} with body {body:?} should be transient, got {err:?}."
		);
	}
}

#[tokio::test]
async fn slow_platform_times_out_as_transient() {
	let server = MockServer::start_async().await;
	let mut descriptor = test_descriptor(&server.base_url());

	descriptor.request_timeout = StdDuration::from_millis(200);

	let (publisher, _store) =
		live_publisher_with(descriptor, Some(UserProfile::from_handle("42", "publisher"))).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(201)
				.header("content-type", "application/json")
				.body(PUBLISH_BODY)
				.delay(StdDuration::from_secs(2));
		})
		.await;

	let err = publisher.publish("Hello").await.expect_err("Slow publish must time out.");

	assert!(matches!(err, Error::Transient(TransientError::Transport(TransportError::Timeout))));
	assert!(err.is_retryable());
	assert_eq!(publisher.publish_report("Hello").await.error_kind, Some(ErrorKind::Transient));
}

#[tokio::test]
async fn invalid_text_is_rejected_before_any_call() {
	let server = MockServer::start_async().await;
	let (publisher, _store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(201).header("content-type", "application/json").body(PUBLISH_BODY);
		})
		.await;

	for text in ["", "   \n\t"] {
		let err = publisher.publish(text).await.expect_err("Blank text must be rejected.");

		assert!(matches!(err, Error::Validation(ValidationError::EmptyText)));
	}

	let err = publisher.publish(&"a".repeat(281)).await.expect_err("Long text must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::TooLong { length: 281, limit: 280 })
	));

	mock.assert_calls_async(0).await;

	// The limit counts characters, not bytes.
	publisher.publish(&"é".repeat(280)).await.expect("280 characters should be accepted.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn empty_store_publishes_simulated_results_offline() {
	let server = MockServer::start_async().await;
	let (platform, _store) = build_reqwest_test_platform(test_descriptor(&server.base_url()));
	let publisher = AuthenticatedPublisher::open(platform).await;
	let publish_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/2/tweets");
			then.status(500);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/me");
			then.status(500);
		})
		.await;
	let status = publisher.status();

	assert!(!status.connected);
	assert!(status.simulated);

	let result = publisher.publish("Hello").await.expect("Simulated publish should succeed.");

	assert!(result.success);
	assert!(result.simulated);
	assert!(result.url.is_some_and(|url| url.contains(".invalid/")));

	let err = publisher.get_profile().await.expect_err("Profile requires a connection.");

	assert!(matches!(err, Error::Auth(AuthError::NotConnected)));

	publish_mock.assert_calls_async(0).await;
	profile_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn disconnect_clears_store_and_reload_reconnects() {
	let server = MockServer::start_async().await;
	let (publisher, store) =
		live_publisher(&server, Some(UserProfile::from_handle("42", "publisher"))).await;

	publisher.disconnect().await.expect("Disconnect should succeed.");

	assert!(store.snapshot().is_none());
	assert!(publisher.status().simulated);
	assert!(publisher.publish("Hello").await.expect("Simulated publish succeeds.").simulated);

	store
		.save(access_token(), Some(UserProfile::from_handle("42", "publisher")))
		.await
		.expect("Saving should succeed.");

	let status = publisher.reload().await.expect("Reload should succeed.");

	assert!(status.connected);
	assert_eq!(status.username.as_deref(), Some("publisher"));

	publisher.disconnect().await.expect("Disconnect should succeed.");
	publisher.connect(access_token(), None);

	assert!(publisher.status().connected);
	assert!(publisher.status().username.is_none());
}
