//! Gateway-level error types shared across the request pipeline, stores, and typed APIs.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was received (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The session could not be refreshed; local credentials have been torn down.
	#[error("Session could not be refreshed: {0}")]
	Refresh(#[from] RefreshError),
	/// Backend answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Response body did not match the expected shape.
	#[error("Backend returned a malformed body (status {status}).")]
	Decode {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[source] serde_json::Error),
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value supplied by the caller or environment.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http(s).
	#[error("Base URL must use http or https, found `{scheme}`.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("Endpoint path `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Endpoint path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout). No response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call exceeded its configured timeout.
	#[error("Backend call timed out.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Reasons a coordinated refresh failed.
///
/// The value is cloned to every request waiting on the refresh, so it only carries owned,
/// cloneable data.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// No refresh token is stored; the refresh endpoint was not called.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// Refresh endpoint rejected the stored refresh token.
	#[error("Refresh endpoint rejected the refresh token with status {status}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
		/// Backend-supplied `detail`, when present.
		detail: Option<String>,
	},
	/// Refresh call never produced a response.
	#[error("Refresh call failed: {message}")]
	Transport {
		/// Rendered transport failure.
		message: String,
	},
	/// Refresh endpoint answered 2xx without a usable access token.
	#[error("Refresh endpoint returned a malformed body: {message}")]
	MalformedResponse {
		/// Rendered parsing failure.
		message: String,
	},
	/// Reading or persisting tokens failed.
	#[error("{0}")]
	Storage(#[from] crate::store::StoreError),
	/// The session was logged out while the refresh was in flight; nothing was persisted.
	#[error("Session ended while the refresh was in flight.")]
	SessionEnded,
	/// The refreshing task was dropped before it settled.
	#[error("Refresh was abandoned before it settled.")]
	Abandoned,
}

/// Non-success response surfaced to the caller.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("Backend responded with status {status}{}.", detail_suffix(.detail))]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// Backend `detail` message, when the body carries one.
	pub detail: Option<String>,
	/// Parsed JSON body, or `Null` when the body was empty or not JSON.
	pub body: serde_json::Value,
}
impl ApiError {
	/// Builds an error from a status and raw body, extracting `detail` when present.
	pub fn from_body(status: u16, body: &[u8]) -> Self {
		let body = serde_json::from_slice::<serde_json::Value>(body).unwrap_or_default();
		let detail = body.get("detail").and_then(serde_json::Value::as_str).map(str::to_owned);

		Self { status, detail, body }
	}

	/// Returns `true` when the backend rejected the caller's credentials.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}
}

fn detail_suffix(detail: &Option<String>) -> String {
	detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}
