#![cfg(feature = "reqwest")]

mod common;

// std
use std::time::Duration as StdDuration;
// crates.io
use futures_util::future;
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use gql_auth_link::{auth::TokenValidity, error::Error, store::TokenStore};

const ME: &str = "query Me { me { id } }";

#[tokio::test]
async fn expired_token_is_renewed_before_the_operation() {
	let server = MockServer::start_async().await;
	let fresh = common::token_expiring_in(Duration::minutes(15));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200).json_body(json!({ "ok": true, "accessToken": fresh.expose() }));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").header("authorization", fresh.bearer());
			then.status(200).json_body(json!({ "data": { "me": { "id": 1 } } }));
		})
		.await;
	let stale = common::token_expiring_in(Duration::minutes(-1));
	let (client, _) = common::build_client(&server, TokenStore::with_token(stale));
	let response = client.query(ME, None).await.expect("Renewed operation should succeed.");

	assert_eq!(response.data, Some(json!({ "me": { "id": 1 } })));
	assert_eq!(client.store().get(), Some(fresh));
	assert_eq!(client.coordinator().validity(), TokenValidity::Usable);

	refresh_mock.assert_async().await;
	api_mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_operations_share_one_refresh() {
	let server = MockServer::start_async().await;
	let fresh = common::token_expiring_in(Duration::minutes(15));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200)
				.delay(StdDuration::from_millis(200))
				.json_body(json!({ "accessToken": fresh.expose() }));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").header("authorization", fresh.bearer());
			then.status(200).json_body(json!({ "data": { "me": null } }));
		})
		.await;
	let stale = common::token_expiring_in(Duration::seconds(-30));
	let (client, _) = common::build_client(&server, TokenStore::with_token(stale));
	let outcomes = future::join_all((0..10).map(|_| client.query(ME, None))).await;

	assert!(outcomes.iter().all(Result::is_ok));
	assert_eq!(client.store().get(), Some(fresh));
	assert_eq!(client.coordinator().metrics().exchanges(), 1);
	assert!(!client.coordinator().is_refreshing());

	refresh_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(10).await;
}

#[tokio::test]
async fn rejected_refresh_keeps_the_store_and_allows_a_retry() {
	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(401).json_body(json!({ "ok": false, "accessToken": "" }));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql");
			then.status(200).json_body(json!({ "data": null }));
		})
		.await;
	let stale = common::token_expiring_in(Duration::minutes(-5));
	let (client, log) = common::build_client(&server, TokenStore::with_token(stale.clone()));
	let err = client.query(ME, None).await.expect_err("Rejected refresh should fail the call.");

	match &err {
		Error::Refresh(refresh) => assert_eq!(refresh.status(), Some(401)),
		other => panic!("Unexpected error: {other:?}."),
	}
	assert!(err.requires_reauthentication());
	assert_eq!(client.store().get(), Some(stale));
	assert!(!client.coordinator().is_refreshing());
	// The gate runs before the observer, so nothing is recorded.
	assert!(log.records().is_empty());

	client.query(ME, None).await.expect_err("Second attempt should refresh again and fail.");

	refresh_mock.assert_calls_async(2).await;
	api_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn malformed_refresh_body_is_a_shape_error() {
	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200).json_body(json!({ "ok": true }));
		})
		.await;
	let stale = common::token_expiring_in(Duration::minutes(-5));
	let (client, _) = common::build_client(&server, TokenStore::with_token(stale));
	let err = client
		.coordinator()
		.ensure_valid()
		.await
		.expect_err("Missing token field should fail the refresh.");

	assert_eq!(err.status(), None);
	assert_eq!(client.coordinator().metrics().failures(), 1);

	refresh_mock.assert_async().await;
}

#[tokio::test]
async fn restore_session_refreshes_an_empty_store() {
	let server = MockServer::start_async().await;
	let fresh = common::token_expiring_in(Duration::hours(1));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200).json_body(json!({ "accessToken": fresh.expose() }));
		})
		.await;
	let (client, _) = common::build_client(&server, TokenStore::new());

	assert_eq!(client.coordinator().validity(), TokenValidity::Absent);

	let token = client.restore_session().await.expect("Session should be restored.");

	assert_eq!(token, fresh);
	assert_eq!(client.store().get(), Some(fresh));

	client.sign_out();

	assert!(client.store().is_empty());

	refresh_mock.assert_async().await;
}

#[tokio::test]
async fn abandoned_refresh_still_commits_the_answer() {
	let server = MockServer::start_async().await;
	let fresh = common::token_expiring_in(Duration::minutes(15));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200)
				.delay(StdDuration::from_millis(300))
				.json_body(json!({ "accessToken": fresh.expose() }));
		})
		.await;
	let stale = common::token_expiring_in(Duration::minutes(-1));
	let (client, _) = common::build_client(&server, TokenStore::with_token(stale));
	let abandoned =
		tokio::time::timeout(StdDuration::from_millis(50), client.coordinator().ensure_valid())
			.await;

	assert!(abandoned.is_err());

	tokio::time::sleep(StdDuration::from_millis(1_000)).await;

	assert_eq!(client.store().get(), Some(fresh));
	assert!(!client.coordinator().is_refreshing());

	client.coordinator().ensure_valid().await.expect("Committed token should pass the gate.");

	refresh_mock.assert_calls_async(1).await;
}
