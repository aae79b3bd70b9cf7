//! Durable key-value storage contract for the session's credentials, plus built-in backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
///
/// Backends hold at most one value per [`TokenSlot`]. The gateway is the sole writer.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `slot`, if present.
	fn get(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Persists or replaces the value stored under `slot`.
	fn set(&self, slot: TokenSlot, value: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes the value stored under `slot`. Removing an absent slot succeeds.
	fn remove(&self, slot: TokenSlot) -> StoreFuture<'_, ()>;

	/// Loads the full pair, returning `None` unless both slots are populated.
	fn load_pair(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		Box::pin(async move {
			let access = self.get(TokenSlot::Access).await?;
			let refresh = self.get(TokenSlot::Refresh).await?;

			Ok(access.zip(refresh).map(|(access_token, refresh_token)| CredentialPair {
				access_token,
				refresh_token,
			}))
		})
	}

	/// Persists both halves of a freshly issued pair.
	fn save_pair<'a>(&'a self, pair: &'a CredentialPair) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.set(TokenSlot::Access, pair.access_token.clone()).await?;
			self.set(TokenSlot::Refresh, pair.refresh_token.clone()).await
		})
	}

	/// Removes both slots. Both removals are attempted even if the first fails.
	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let access = self.remove(TokenSlot::Access).await;
			let refresh = self.remove(TokenSlot::Refresh).await;

			access.and(refresh)
		})
	}
}

/// Named slots persisted by a [`TokenStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSlot {
	/// Short-lived access token.
	#[serde(rename = "accessToken")]
	Access,
	/// Longer-lived refresh token.
	#[serde(rename = "refreshToken")]
	Refresh,
}
impl TokenSlot {
	/// Returns the storage key for the slot.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSlot::Access => "accessToken",
			TokenSlot::Refresh => "refreshToken",
		}
	}
}
impl Display for TokenSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
