#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use ride_gateway::{_preludet::*, store::TokenSlot};

#[tokio::test]
async fn logout_notifies_backend_and_clears_credentials() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(&server.url("/api"));

	seed_credentials(&store, "T1", "R1").await;

	let logout = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/users/logout/")
				.header("authorization", "Bearer T1")
				.json_body(json!({ "refresh": "R1" }));
			then.status(205);
		})
		.await;

	gateway.logout().await.expect("Logout should succeed.");

	logout.assert_calls_async(1).await;
	assert!(store.is_empty());
	assert!(gateway.default_bearer().is_none());
}

#[tokio::test]
async fn logout_clears_credentials_when_backend_fails() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(&server.url("/api"));

	seed_credentials(&store, "T1", "R1").await;

	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users/logout/");
			then.status(500).body("upstream exploded");
		})
		.await;

	gateway.logout().await.expect("Backend failures during logout are swallowed.");

	logout.assert_calls_async(1).await;
	assert_eq!(stored(&store, TokenSlot::Access).await, None);
	assert_eq!(stored(&store, TokenSlot::Refresh).await, None);
}

#[tokio::test]
async fn logout_without_session_skips_backend() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(&server.url("/api"));
	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users/logout/");
			then.status(205);
		})
		.await;

	gateway.logout().await.expect("Logout with no session should succeed.");
	gateway.logout().await.expect("Logout is idempotent.");

	logout.assert_calls_async(0).await;
	assert!(store.is_empty());
}

#[tokio::test]
async fn logout_with_unreachable_backend_still_clears_credentials() {
	// Nothing listens on the discard port, so the notification fails at the transport layer.
	let (gateway, store) = build_reqwest_test_gateway("http://127.0.0.1:9/api");

	seed_credentials(&store, "T1", "R1").await;
	gateway.logout().await.expect("Transport failures during logout are swallowed.");

	assert!(store.is_empty());
}
