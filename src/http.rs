//! Transport primitives for backend calls.
//!
//! The module exposes [`HttpTransport`], the gateway's only dependency on an HTTP stack,
//! together with the request model ([`ApiRequest`]) and response model ([`ApiResponse`]) that
//! flow through the gateway pipeline. Transports work on plain [`http`](::http) types so
//! downstream crates can plug in any client; the crate ships a reqwest-backed
//! [`ReqwestTransport`] behind the default `reqwest` feature.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
#[cfg(feature = "reqwest")] use crate::config::GatewayConfig;
use crate::{_prelude::*, error::TransportError};

/// Fully prepared outbound request (absolute URI, headers, serialized body).
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Raw response handed back by a transport.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients capable of executing one backend call.
///
/// Implementations must resolve to `Ok` for every response that was received, whatever its
/// status, and to `Err` only when no response arrived (DNS, TCP, TLS, timeout). The gateway
/// relies on that split to keep network failures out of the refresh path. Each call must be
/// bounded by a timeout and report its expiry as [`TransportError::Timeout`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once a response (of any status) or a network error arrives.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`]. The caller owns its timeout policy.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose calls are bounded by the configured timeout.
	pub fn from_config(config: &GatewayConfig) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().timeout(config.timeout_std()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
