#![cfg(feature = "reqwest")]

// std
use std::{net::TcpListener, time::Duration as StdDuration};
// crates.io
use httpmock::prelude::*;
// self
use rbhub_provider::{
	_preludet::*,
	auth::SessionState,
	http::RequestContext,
	provider::{AuthorizationHeader, validate_token},
};

const VALIDATE_PATH: &str = "/v1/user/self";

#[tokio::test]
async fn accepted_token_validates() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(mock_options(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(VALIDATE_PATH)
				.header("authorization", "Bearer access-ok")
				.header("accept", "application/json");
			then.status(200).body("{\"data\":{}}");
		})
		.await;

	assert!(
		provider
			.validate_session(&RequestContext::background(), &SessionState::new("access-ok"))
			.await
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn non_200_statuses_do_not_validate() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(mock_options(&server.base_url()));
	let unauthorized = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH).header("authorization", "Bearer revoked");
			then.status(401).body("{\"error\":\"invalid_token\"}");
		})
		.await;
	let no_content = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH).header("authorization", "Bearer no-content");
			then.status(204);
		})
		.await;
	let ctx = RequestContext::background();

	assert!(!provider.validate_session(&ctx, &SessionState::new("revoked")).await);
	assert!(!provider.validate_session(&ctx, &SessionState::new("no-content")).await);

	unauthorized.assert_async().await;
	no_content.assert_async().await;
}

#[tokio::test]
async fn empty_token_is_invalid_without_a_request() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(mock_options(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(200);
		})
		.await;

	assert!(!provider.validate_session(&RequestContext::background(), &SessionState::new("")).await);
	assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn transport_failures_and_deadlines_do_not_validate() {
	let listener =
		TcpListener::bind("127.0.0.1:0").expect("Ephemeral port should be available for binding.");
	let port = listener.local_addr().expect("Bound listener should expose its address.").port();

	drop(listener);

	let refused = build_reqwest_test_provider(mock_options(&format!("http://127.0.0.1:{port}")));

	assert!(
		!refused
			.validate_session(&RequestContext::background(), &SessionState::new("access-refused"))
			.await
	);

	let server = MockServer::start_async().await;
	let slow = build_reqwest_test_provider(mock_options(&server.base_url()));
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(200).delay(StdDuration::from_secs(2));
		})
		.await;
	let ctx = RequestContext::background().with_timeout(StdDuration::from_millis(100));

	assert!(!slow.validate_session(&ctx, &SessionState::new("access-slow")).await);
}

#[tokio::test]
async fn empty_header_set_sends_token_as_query_parameter() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH).query_param("access_token", "query-token");
			then.status(200);
		})
		.await;
	let validate_url = Url::parse(&server.url(VALIDATE_PATH)).expect("Validate URL should parse.");
	let client = test_reqwest_http_client();
	let valid = validate_token(
		&RequestContext::background(),
		&client,
		&rbhub_provider::oauth::ReqwestTransportErrorMapper,
		&validate_url,
		"query-token",
		&AuthorizationHeader::default(),
	)
	.await;

	mock.assert_async().await;

	assert!(valid);
}
