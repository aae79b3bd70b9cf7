//! Outbound request model carried through the gateway pipeline.

// crates.io
use ::http::{
	Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*, auth::TokenSecret, config::GatewayConfig, error::ConfigError, http::HttpRequest,
};

/// One logical backend call: immutable parameters plus its retry state.
///
/// The `retried` flag is the only mutable part. The gateway sets it before replaying a request
/// after a token refresh, and a retried request is never intercepted again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	method: Method,
	path: String,
	body: Option<Vec<u8>>,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for `path`, relative to the configured base URL.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), body: None, retried: false }
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(Error::Encode)?);

		Ok(self)
	}

	/// Marks the request as already retried once.
	pub fn into_retry(mut self) -> Self {
		self.retried = true;

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Path relative to the base URL, possibly with a query string.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Serialized JSON body, if any.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Whether the gateway has already replayed this request once.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Resolves the request into a transport-ready [`HttpRequest`], attaching `bearer` when set.
	pub fn prepare(
		&self,
		config: &GatewayConfig,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let url = config.endpoint(&self.path)?;
		let mut builder = ::http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.header(ACCEPT, "application/json");

		if let Some(token) = bearer {
			builder = builder.header(AUTHORIZATION, token.bearer());
		}
		if self.body.is_some() {
			builder = builder.header(CONTENT_TYPE, "application/json");
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}
