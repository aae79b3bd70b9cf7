#![cfg(feature = "reqwest")]

// std
use std::{io, time::Duration as StdDuration};
// self
use ride_gateway::{
	_preludet::*,
	auth::{CredentialPair, TokenSecret},
	config::GatewayConfig,
	error::{RefreshError, TransportError},
	gateway::Gateway,
	http::{ApiRequest, HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	http_types::{Method, Response, header::AUTHORIZATION},
	store::{MemoryStore, StoreError, StoreFuture, TokenSlot, TokenStore},
};

type Responder = dyn Fn(&Seen) -> Result<HttpResponse, TransportError> + Send + Sync;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Seen {
	method: Method,
	path: String,
	authorization: Option<String>,
}

/// In-process transport that answers from a closure and records what it was asked to send.
struct ScriptedTransport {
	seen: Mutex<Vec<Seen>>,
	refresh_delay: StdDuration,
	respond: Box<Responder>,
}
impl ScriptedTransport {
	fn new(
		refresh_delay: StdDuration,
		respond: impl Fn(&Seen) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
	) -> Self {
		Self { seen: Mutex::new(Vec::new()), refresh_delay, respond: Box::new(respond) }
	}

	fn calls_to(&self, suffix: &str) -> usize {
		self.seen.lock().iter().filter(|seen| seen.path.ends_with(suffix)).count()
	}

	fn seen(&self) -> Vec<Seen> {
		self.seen.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let seen = Seen {
				method: request.method().clone(),
				path: request.uri().path().to_owned(),
				authorization: request
					.headers()
					.get(AUTHORIZATION)
					.and_then(|value| value.to_str().ok())
					.map(str::to_owned),
			};

			self.seen.lock().push(seen.clone());

			if seen.path.ends_with("/token/refresh/") {
				tokio::time::sleep(self.refresh_delay).await;
			}

			(self.respond)(&seen)
		})
	}
}

fn reply(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
	Ok(Response::builder()
		.status(status)
		.header("content-type", "application/json")
		.body(body.as_bytes().to_vec())
		.expect("Scripted response should build."))
}

/// Store whose removals always fail, leaving credentials behind.
struct StickyStore(MemoryStore);
impl TokenStore for StickyStore {
	fn get(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenSecret>> {
		self.0.get(slot)
	}

	fn set(&self, slot: TokenSlot, value: TokenSecret) -> StoreFuture<'_, ()> {
		self.0.set(slot, value)
	}

	fn remove(&self, _slot: TokenSlot) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(StoreError::Backend { message: "keychain is locked".into() }) })
	}
}

fn build_gateway(
	transport: ScriptedTransport,
) -> (Gateway<ScriptedTransport>, Arc<ScriptedTransport>, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let (gateway, transport) = build_gateway_over(transport, store_backend.clone());

	(gateway, transport, store_backend)
}

fn build_gateway_over(
	transport: ScriptedTransport,
	store: Arc<dyn TokenStore>,
) -> (Gateway<ScriptedTransport>, Arc<ScriptedTransport>) {
	let config = GatewayConfig::new("http://gateway.test/api")
		.expect("Scripted base URL should be accepted by the gateway config.");
	let transport = Arc::new(transport);
	let gateway = Gateway::with_transport(config, store, transport.clone());

	(gateway, transport)
}

/// Backend where only `T2` is a valid access token.
fn rotating_backend(seen: &Seen) -> Result<HttpResponse, TransportError> {
	if seen.path.ends_with("/token/refresh/") {
		reply(200, r#"{"access":"T2"}"#)
	} else if seen.authorization.as_deref() == Some("Bearer T2") {
		reply(200, "[]")
	} else {
		reply(401, r#"{"detail":"Given token not valid for any token type"}"#)
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_failures_trigger_a_single_refresh() {
	const CALLERS: usize = 8;

	let (gateway, transport, store) =
		build_gateway(ScriptedTransport::new(StdDuration::from_millis(200), rotating_backend));

	seed_credentials(&store, "T1", "R1").await;

	let handles: Vec<_> = (0..CALLERS)
		.map(|i| {
			let gateway = gateway.clone();

			tokio::spawn(async move {
				gateway.send(ApiRequest::get(format!("/rides/?page={i}"))).await
			})
		})
		.collect();

	for handle in handles {
		let response = handle
			.await
			.expect("Caller task should not panic.")
			.expect("Every caller should be replayed successfully.");

		assert_eq!(response.status().as_u16(), 200);
	}

	assert_eq!(transport.calls_to("/token/refresh/"), 1);
	assert_eq!(transport.calls_to("/rides/"), CALLERS * 2);
	assert_eq!(gateway.refresh_metrics.attempts(), 1);
	assert_eq!(gateway.refresh_metrics.queued(), (CALLERS - 1) as u64);
	assert_eq!(gateway.pending_refreshes(), 0);
	assert!(!gateway.is_refreshing());
	assert_eq!(stored(&store, TokenSlot::Access).await.as_deref(), Some("T2"));
}

#[tokio::test]
async fn replay_carries_the_refreshed_bearer() {
	let (gateway, transport, store) =
		build_gateway(ScriptedTransport::new(StdDuration::ZERO, rotating_backend));

	seed_credentials(&store, "T1", "R1").await;
	gateway.send(ApiRequest::get("/rides/")).await.expect("Replay should succeed.");

	let authorizations: Vec<_> =
		transport.seen().into_iter().map(|seen| (seen.path, seen.authorization)).collect();

	assert_eq!(
		authorizations,
		vec![
			("/api/rides/".to_owned(), Some("Bearer T1".to_owned())),
			("/api/users/token/refresh/".to_owned(), None),
			("/api/rides/".to_owned(), Some("Bearer T2".to_owned())),
		]
	);
}

#[tokio::test]
async fn requests_without_credentials_carry_no_authorization() {
	let (gateway, transport, _store) =
		build_gateway(ScriptedTransport::new(StdDuration::ZERO, |_| reply(200, "{}")));

	gateway
		.send(ApiRequest::post("/users/password-reset/"))
		.await
		.expect("Unauthenticated call should succeed.");

	let seen = transport.seen();

	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].method, Method::POST);
	assert_eq!(seen[0].authorization, None);
}

#[tokio::test]
async fn default_bearer_is_used_when_store_has_no_access_token() {
	let (gateway, transport, store) =
		build_gateway(ScriptedTransport::new(StdDuration::ZERO, |_| reply(200, "[]")));

	gateway
		.store_credentials(&CredentialPair::new("T1", "R1"))
		.await
		.expect("Storing credentials should succeed.");
	store.remove(TokenSlot::Access).await.expect("Removing the access token should succeed.");
	gateway.send(ApiRequest::get("/rides/")).await.expect("Request should succeed.");

	assert_eq!(transport.seen()[0].authorization.as_deref(), Some("Bearer T1"));
}

#[tokio::test]
async fn timeouts_surface_without_refresh() {
	let (gateway, transport, store) = build_gateway(ScriptedTransport::new(
		StdDuration::ZERO,
		|seen: &Seen| {
			if seen.path.ends_with("/rides/") { Err(TransportError::Timeout) } else { reply(200, "{}") }
		},
	));

	seed_credentials(&store, "T1", "R1").await;

	let err = gateway
		.send(ApiRequest::get("/rides/"))
		.await
		.expect_err("A timed out call must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout)));
	assert_eq!(transport.calls_to("/token/refresh/"), 0);
	assert_eq!(stored(&store, TokenSlot::Access).await.as_deref(), Some("T1"));
}

#[tokio::test]
async fn refresh_transport_failure_tears_down_and_reports() {
	let (gateway, transport, store) = build_gateway(ScriptedTransport::new(
		StdDuration::ZERO,
		|seen: &Seen| {
			if seen.path.ends_with("/token/refresh/") {
				Err(TransportError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
			} else if seen.path.ends_with("/users/logout/") {
				reply(205, "")
			} else {
				reply(401, "{}")
			}
		},
	));

	seed_credentials(&store, "T1", "R1").await;

	let err = gateway
		.send(ApiRequest::patch("/rides/4/finish/"))
		.await
		.expect_err("A refresh that never reached the backend must fail.");

	assert!(matches!(err, Error::Refresh(RefreshError::Transport { .. })));
	assert_eq!(transport.calls_to("/users/logout/"), 1);
	assert!(store.is_empty());
	assert!(gateway.default_bearer().is_none());
}

#[tokio::test]
async fn teardown_storage_failure_is_reported_to_callers() {
	let memory = MemoryStore::default();

	seed_credentials(&memory, "T1", "R1").await;

	let (gateway, transport) = build_gateway_over(
		ScriptedTransport::new(StdDuration::ZERO, |seen: &Seen| {
			if seen.path.ends_with("/users/logout/") { reply(205, "") } else { reply(401, "{}") }
		}),
		Arc::new(StickyStore(memory.clone())),
	);
	let err = gateway
		.send(ApiRequest::get("/rides/"))
		.await
		.expect_err("A rejected refresh must fail.");

	match err {
		Error::Refresh(RefreshError::Storage(StoreError::Backend { message })) => {
			assert_eq!(message, "keychain is locked");
		},
		other => panic!("Expected the teardown storage failure, got {other:?}."),
	}

	assert_eq!(transport.calls_to("/token/refresh/"), 1);
	assert_eq!(stored(&memory, TokenSlot::Refresh).await.as_deref(), Some("R1"));
	assert!(gateway.default_bearer().is_none());
}
