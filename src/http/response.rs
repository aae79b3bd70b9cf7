//! Response wrapper with status helpers and path-aware JSON decoding.

// crates.io
use ::http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ApiError, http::HttpResponse};

/// Response received from the backend, whatever its status.
#[derive(Debug)]
pub struct ApiResponse(HttpResponse);
impl ApiResponse {
	/// Wraps a raw transport response.
	pub fn new(inner: HttpResponse) -> Self {
		Self(inner)
	}

	/// HTTP status.
	pub fn status(&self) -> StatusCode {
		self.0.status()
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.0.status().is_success()
	}

	/// Returns `true` when the backend answered 401.
	pub fn is_unauthorized(&self) -> bool {
		self.0.status() == StatusCode::UNAUTHORIZED
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		self.0.headers()
	}

	/// Raw response body.
	pub fn body(&self) -> &[u8] {
		self.0.body()
	}

	/// Decodes the body, reporting the failing JSON path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(self.body());

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source, status: self.status().as_u16() })
	}

	/// Converts non-2xx responses into [`Error::Api`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(ApiError::from_body(self.status().as_u16(), self.body()).into())
		}
	}

	/// Returns the wrapped transport response.
	pub fn into_inner(self) -> HttpResponse {
		self.0
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(inner: HttpResponse) -> Self {
		Self::new(inner)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		let mut raw = HttpResponse::new(body.as_bytes().to_vec());

		*raw.status_mut() = StatusCode::from_u16(status).expect("Status fixture should be valid.");

		ApiResponse::new(raw)
	}

	#[derive(Debug, Deserialize)]
	struct Access {
		#[allow(dead_code)]
		access: String,
	}

	#[test]
	fn json_errors_carry_path_and_status() {
		let err = response(200, r#"{"access": 5}"#)
			.json::<Access>()
			.expect_err("Numeric access token should fail to decode.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "access");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn error_for_status_passes_success_and_maps_failures() {
		assert!(response(201, "{}").error_for_status().is_ok());

		let err = response(401, r#"{"detail":"Given token not valid"}"#)
			.error_for_status()
			.expect_err("401 should become an API error.");

		match err {
			Error::Api(api) => {
				assert!(api.is_unauthorized());
				assert_eq!(api.detail.as_deref(), Some("Given token not valid"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
