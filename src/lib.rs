//! Authenticated HTTP gateway for the ride-reservation backend: bearer decoration, single-flight
//! token refresh with request replay, and session teardown behind one `send` call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod rides;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{CredentialPair, TokenSecret},
		config::GatewayConfig,
		gateway::ReqwestGateway,
		store::{MemoryStore, TokenSlot, TokenStore},
	};

	/// Builds a reqwest-backed [`ReqwestGateway`] over a fresh in-memory store.
	pub fn build_reqwest_test_gateway(base_url: &str) -> (ReqwestGateway, Arc<MemoryStore>) {
		let config = GatewayConfig::new(base_url)
			.expect("Test base URL should be accepted by the gateway config.")
			.with_timeout(Duration::seconds(5));
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let gateway = ReqwestGateway::new(config, store)
			.expect("Reqwest transport should build for integration tests.");

		(gateway, store_backend)
	}

	/// Seeds both token slots so requests start out authenticated.
	pub async fn seed_credentials(store: &MemoryStore, access: &str, refresh: &str) {
		store
			.save_pair(&CredentialPair::new(access, refresh))
			.await
			.expect("Failed to seed credentials into the memory store.");
	}

	/// Reads a slot from the store, returning the exposed secret.
	pub async fn stored(store: &MemoryStore, slot: TokenSlot) -> Option<String> {
		store
			.get(slot)
			.await
			.expect("Memory store reads should not fail.")
			.map(|secret: TokenSecret| secret.expose().to_owned())
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
