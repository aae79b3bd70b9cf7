//! Account operations: login, registration, password reset.
//!
//! Login and registration target endpoints that are exempt from refresh interception, so a 401
//! there (bad credentials) surfaces directly as [`Error::Api`].

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	endpoints,
	gateway::Gateway,
	http::{ApiRequest, ApiResponse, HttpTransport},
};

/// Registration payload.
#[derive(Clone, Serialize)]
pub struct NewAccount {
	/// Desired username.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Plain-text password; only ever sent to the registration endpoint.
	pub password: String,
}
impl NewAccount {
	/// Creates a registration payload.
	pub fn new(
		username: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self { username: username.into(), email: email.into(), password: password.into() }
	}
}
impl Debug for NewAccount {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NewAccount")
			.field("username", &self.username)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

#[derive(Serialize)]
struct LoginBody<'a> {
	username: &'a str,
	password: &'a str,
}

#[derive(Serialize)]
struct PasswordResetBody<'a> {
	email: &'a str,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges credentials for a token pair, persists it, and makes the access token the
	/// default bearer.
	pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
		let request = ApiRequest::post(endpoints::LOGIN).json(&LoginBody { username, password })?;
		let pair = self.send(request).await?.error_for_status()?.json::<CredentialPair>()?;

		self.store_credentials(&pair).await?;

		Ok(pair)
	}

	/// Creates an account and returns the backend's response body (`Null` when empty).
	pub async fn register(&self, account: &NewAccount) -> Result<serde_json::Value> {
		let request = ApiRequest::post(endpoints::REGISTER).json(account)?;
		let response = self.send(request).await?.error_for_status()?;

		json_or_null(&response)
	}

	/// Asks the backend to send a password reset email.
	pub async fn request_password_reset(&self, email: &str) -> Result<()> {
		let request =
			ApiRequest::post(endpoints::PASSWORD_RESET).json(&PasswordResetBody { email })?;

		self.send(request).await?.error_for_status()?;

		Ok(())
	}
}

fn json_or_null(response: &ApiResponse) -> Result<serde_json::Value> {
	if response.body().iter().all(u8::is_ascii_whitespace) {
		Ok(serde_json::Value::Null)
	} else {
		response.json()
	}
}
