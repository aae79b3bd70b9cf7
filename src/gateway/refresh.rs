//! Coordinated token refresh with single-flight semantics and request replay.
//!
//! The first request to hit a qualifying 401 becomes the refresh *leader*: it flips the
//! coordinator into the in-flight state, exchanges the stored refresh token at
//! `/users/token/refresh/`, persists the result, and settles every request that queued up behind
//! it. Requests that hit a 401 while the leader is working become *followers* and suspend on the
//! coordinator until it settles. Leader and followers then replay their original request once
//! with the new token. A failed refresh tears the session down exactly once (leader only) and
//! fails every participant with the same [`RefreshError`].

mod coordinator;
mod metrics;

pub use self::coordinator::{
	LeaderGuard, PendingRefresh, RefreshCoordinator, RefreshResult, Ticket,
};
pub use self::metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	endpoints,
	error::{ApiError, RefreshError},
	gateway::{Gateway, RefreshTokenBody},
	http::{ApiRequest, ApiResponse, HttpTransport},
	obs::{self, OpKind, OpSpan, Outcome},
	store::TokenSlot,
};

/// Successful refresh payload; `refresh` is present when the backend rotates refresh tokens.
#[derive(Deserialize)]
struct RefreshedTokens {
	access: TokenSecret,
	#[serde(default)]
	refresh: Option<TokenSecret>,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Recovers a qualifying authentication failure by joining (or leading) the refresh, then
	/// replaying `request` exactly once with the resulting token.
	pub(crate) async fn recover(&self, request: ApiRequest) -> Result<ApiResponse> {
		let request = request.into_retry();
		let token = match self.coordinator.join() {
			Ticket::Leader(leader) => self.lead_refresh(leader).await,
			Ticket::Follower(pending) => {
				self.refresh_metrics.record_queued();
				obs::refresh_event("queued", self.coordinator.waiting());

				pending.wait().await
			},
		}?;

		self.dispatch(&request, Some(&token)).await
	}

	async fn lead_refresh(&self, leader: LeaderGuard<'_>) -> RefreshResult {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "lead_refresh");

		obs::record_outcome(KIND, Outcome::Attempt);
		obs::refresh_event("started", self.coordinator.waiting());
		self.refresh_metrics.record_attempt();

		let result = match span.instrument(self.refresh_session()).await {
			Ok(token) => {
				self.refresh_metrics.record_success();
				obs::record_outcome(KIND, Outcome::Success);

				Ok(token)
			},
			// A concurrent logout already tore the session down.
			Err(RefreshError::SessionEnded) => {
				self.refresh_metrics.record_failure();
				obs::record_outcome(KIND, Outcome::Failure);

				Err(RefreshError::SessionEnded)
			},
			Err(e) => {
				self.refresh_metrics.record_failure();
				obs::record_outcome(KIND, Outcome::Failure);

				match self.teardown().await {
					Ok(()) => Err(e),
					// Tokens may still be stored, which outranks the refresh failure itself.
					Err(Error::Storage(store_error)) => Err(RefreshError::Storage(store_error)),
					Err(other) => {
						obs::swallowed_failure(OpKind::Logout, &other);

						Err(e)
					},
				}
			},
		};
		let waiters = leader.settle(&result);

		obs::refresh_event("settled", waiters);
		obs::record_refresh_waiters(waiters);

		result
	}

	/// Exchanges the stored refresh token and persists the new access token.
	async fn refresh_session(&self) -> RefreshResult {
		let epoch = self.session_epoch();
		let refresh =
			self.store.get(TokenSlot::Refresh).await?.ok_or(RefreshError::MissingRefreshToken)?;
		let request = ApiRequest::post(endpoints::TOKEN_REFRESH)
			.json(&RefreshTokenBody { refresh: refresh.expose() })
			.map_err(transport_failure)?;
		let response = self.dispatch(&request, None).await.map_err(transport_failure)?;

		if !response.is_success() {
			let rejected = ApiError::from_body(response.status().as_u16(), response.body());

			return Err(RefreshError::Rejected {
				status: rejected.status,
				detail: rejected.detail,
			});
		}

		let issued = response.json::<RefreshedTokens>().map_err(|e| {
			let message = match e {
				Error::Decode { source, .. } => source.to_string(),
				other => other.to_string(),
			};

			RefreshError::MalformedResponse { message }
		})?;

		if issued.access.expose().is_empty() {
			return Err(RefreshError::MalformedResponse {
				message: "access token is empty".into(),
			});
		}

		// Held while persisting so a logout cannot interleave with the writes below.
		let _serialized = self.teardown_guard.lock().await;

		if self.session_epoch() != epoch {
			return Err(RefreshError::SessionEnded);
		}

		self.store.set(TokenSlot::Access, issued.access.clone()).await?;

		if let Some(rotated) = issued.refresh {
			self.store.set(TokenSlot::Refresh, rotated).await?;
		}

		*self.default_bearer.write() = Some(issued.access.clone());

		Ok(issued.access)
	}
}

fn transport_failure(e: Error) -> RefreshError {
	RefreshError::Transport { message: e.to_string() }
}
