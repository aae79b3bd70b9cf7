//! Response classification deciding whether the gateway intercepts a failure.

// crates.io
use ::http::StatusCode;
// self
use crate::{endpoints, http::ApiRequest};

/// What the gateway does with a received response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
	/// Hand the response to the caller unchanged.
	PassThrough,
	/// Qualifying authentication failure: refresh (or wait for the in-flight refresh) and replay.
	RefreshAndRetry,
}

/// Classifies a response to `request`.
///
/// A qualifying authentication failure is a 401 on a request that has not been replayed yet and
/// that does not target login, registration, or token refresh.
pub fn classify(request: &ApiRequest, status: StatusCode) -> Disposition {
	if status == StatusCode::UNAUTHORIZED
		&& !request.is_retried()
		&& !endpoints::is_auth_endpoint(request.path())
	{
		Disposition::RefreshAndRetry
	} else {
		Disposition::PassThrough
	}
}
