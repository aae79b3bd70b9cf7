//! Access/refresh credential pair issued by the backend on login.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access + refresh token pair persisted by a [`TokenStore`](crate::store::TokenStore).
///
/// The gateway never interprets either value; they are opaque bearer strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential attached to every request.
	#[serde(rename = "access")]
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for a new access token.
	#[serde(rename = "refresh")]
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Creates a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access), refresh_token: TokenSecret::new(refresh) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn pair_reads_login_response_shape() {
		let pair: CredentialPair =
			serde_json::from_str(r#"{"access":"a-1","refresh":"r-1","user":{"id":7}}"#)
				.expect("Login response should deserialize into a credential pair.");

		assert_eq!(pair.access_token.expose(), "a-1");
		assert_eq!(pair.refresh_token.expose(), "r-1");
		assert!(!format!("{pair:?}").contains("a-1"));
	}
}
