//! Authenticated request gateway: bearer decoration, failure interception, coordinated refresh,
//! and session teardown around a single [`Gateway::send`] operation.
//!
//! Every call runs the same pipeline:
//!
//! 1. **decorate**: attach the stored access token (or the default bearer) when one exists;
//! 2. **transmit** through the configured [`HttpTransport`];
//! 3. **classify** the response with [`classify::classify`];
//! 4. **recover** qualifying 401s through the single-flight refresh in [`refresh`], replaying the
//!    request once with the new token.
//!
//! Anything that is not a qualifying authentication failure is returned to the caller untouched.

pub mod classify;
pub mod refresh;

pub use classify::*;
pub use refresh::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestTransport};
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	config::GatewayConfig,
	endpoints,
	http::{ApiRequest, ApiResponse, HttpTransport},
	obs::{self, OpKind, OpSpan, Outcome},
	store::{TokenSlot, TokenStore},
};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Wraps outbound backend calls with credential handling.
///
/// The gateway owns the transport, the credential store, and the refresh coordination state, so
/// screens and typed API helpers only ever see final outcomes. Clones are cheap and share all
/// state, including the in-flight refresh, which keeps the single-flight guarantee across every
/// handle derived from the same gateway.
pub struct Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound request.
	pub transport: Arc<T>,
	/// Durable credential store; the gateway is its sole writer.
	pub store: Arc<dyn TokenStore>,
	/// Base URL and timeout settings.
	pub config: GatewayConfig,
	/// Shared counters for refresh coordination.
	pub refresh_metrics: Arc<RefreshMetrics>,
	coordinator: Arc<RefreshCoordinator>,
	default_bearer: Arc<RwLock<Option<TokenSecret>>>,
	teardown_guard: Arc<AsyncMutex<()>>,
	/// Bumped by every teardown; a refresh only persists if it is unchanged.
	session_epoch: Arc<AtomicU64>,
}
impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gateway over a caller-provided transport.
	pub fn with_transport(
		config: GatewayConfig,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			coordinator: Default::default(),
			default_bearer: Default::default(),
			teardown_guard: Default::default(),
			session_epoch: Default::default(),
		}
	}

	/// Sends `request` through the pipeline.
	///
	/// Returns `Ok` for every response that is not recovered locally, whatever its status; use
	/// [`ApiResponse::error_for_status`] to turn non-2xx responses into errors. Fails with
	/// [`Error::Transport`] when no response arrived and with [`Error::Refresh`] when a
	/// qualifying 401 could not be recovered.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: OpKind = OpKind::Request;

		let span = OpSpan::new(KIND, "send");

		obs::record_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let bearer = self.bearer().await?;
				let response = self.dispatch(&request, bearer.as_ref()).await?;

				match classify::classify(&request, response.status()) {
					Disposition::PassThrough => Ok(response),
					Disposition::RefreshAndRetry => self.recover(request).await,
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_outcome(KIND, Outcome::Failure),
		}

		result
	}

	/// Tears down the session.
	///
	/// Notifies the backend so it can invalidate the refresh token (best effort: failures are
	/// logged and ignored), then removes both stored tokens and clears the default bearer.
	/// Safe to call at any time, including with no stored credentials or while a refresh is in
	/// flight. Only storage failures are returned.
	pub async fn logout(&self) -> Result<()> {
		const KIND: OpKind = OpKind::Logout;

		let span = OpSpan::new(KIND, "logout");

		obs::record_outcome(KIND, Outcome::Attempt);

		let result = span.instrument(self.teardown()).await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_outcome(KIND, Outcome::Failure),
		}

		result
	}

	/// Persists a freshly issued pair and makes its access token the default bearer.
	pub async fn store_credentials(&self, pair: &CredentialPair) -> Result<()> {
		self.store.save_pair(pair).await?;

		*self.default_bearer.write() = Some(pair.access_token.clone());

		Ok(())
	}

	/// Bearer credential used when the store holds no access token.
	pub fn default_bearer(&self) -> Option<TokenSecret> {
		self.default_bearer.read().clone()
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_in_flight()
	}

	/// Number of requests currently waiting on the in-flight refresh.
	pub fn pending_refreshes(&self) -> usize {
		self.coordinator.waiting()
	}

	async fn bearer(&self) -> Result<Option<TokenSecret>> {
		match self.store.get(TokenSlot::Access).await? {
			Some(token) => Ok(Some(token)),
			None => Ok(self.default_bearer()),
		}
	}

	/// Prepares and transmits one request without interception.
	async fn dispatch(
		&self,
		request: &ApiRequest,
		bearer: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let prepared = request.prepare(&self.config, bearer)?;
		let response = self.transport.execute(prepared).await?;

		Ok(ApiResponse::new(response))
	}

	/// Serialized teardown shared by explicit logout and refresh failure.
	async fn teardown(&self) -> Result<()> {
		let _serialized = self.teardown_guard.lock().await;

		self.session_epoch.fetch_add(1, Ordering::AcqRel);

		match self.store.get(TokenSlot::Refresh).await {
			Ok(Some(refresh)) => self.notify_logout(&refresh).await,
			Ok(None) => {},
			Err(e) => obs::swallowed_failure(OpKind::Logout, &e),
		}

		*self.default_bearer.write() = None;

		self.store.clear().await?;

		Ok(())
	}

	fn session_epoch(&self) -> u64 {
		self.session_epoch.load(Ordering::Acquire)
	}

	/// Best-effort server-side invalidation. Sent directly through the transport so a 401 here
	/// can never start another refresh.
	async fn notify_logout(&self, refresh: &TokenSecret) {
		let outcome: Result<()> = async {
			let bearer = self.bearer().await?;
			let request = ApiRequest::post(endpoints::LOGOUT)
				.json(&RefreshTokenBody { refresh: refresh.expose() })?;

			self.dispatch(&request, bearer.as_ref()).await?.error_for_status()?;

			Ok(())
		}
		.await;

		if let Err(e) = outcome {
			obs::swallowed_failure(OpKind::Logout, &e);
		}
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway that provisions its own reqwest transport bounded by the configured
	/// timeout.
	pub fn new(config: GatewayConfig, store: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			coordinator: self.coordinator.clone(),
			default_bearer: self.default_bearer.clone(),
			teardown_guard: self.teardown_guard.clone(),
			session_epoch: self.session_epoch.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.config.base_url.as_str())
			.field("refreshing", &self.is_refreshing())
			.field("default_bearer_set", &self.default_bearer.read().is_some())
			.finish()
	}
}

/// `{"refresh": ..}` body shared by the refresh and logout endpoints.
#[derive(Serialize)]
pub(crate) struct RefreshTokenBody<'a> {
	pub(crate) refresh: &'a str,
}
