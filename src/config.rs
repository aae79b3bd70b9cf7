//! Gateway configuration: backend base URL and per-call timeout.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable consulted by [`GatewayConfig::from_env`].
pub const BASE_URL_ENV: &str = "RIDE_API_URL";
/// Base URL used when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://host.docker.internal:8000/api";

/// Resolved settings shared by every gateway call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
	/// Backend root; endpoint paths are appended to its path (e.g. `/api`).
	pub base_url: Url,
	/// Upper bound for a single outbound call, after which it fails as a transport timeout.
	pub timeout: Duration,
}
impl GatewayConfig {
	const DEFAULT_TIMEOUT: Duration = Duration::seconds(30);

	/// Validates `base_url` and applies the default timeout.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		let parsed = Url::parse(base_url.trim()).map_err(|source| {
			ConfigError::InvalidBaseUrl { value: base_url.to_owned(), source }
		})?;

		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: parsed.scheme().to_owned() });
		}

		Ok(Self { base_url: parsed, timeout: Self::DEFAULT_TIMEOUT })
	}

	/// Resolves the base URL from [`BASE_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		match env::var(BASE_URL_ENV) {
			Ok(value) if !value.trim().is_empty() => Self::new(&value),
			_ => Self::new(DEFAULT_BASE_URL),
		}
	}

	/// Overrides the per-call timeout. Non-positive values fall back to the default.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = if timeout.is_positive() { timeout } else { Self::DEFAULT_TIMEOUT };

		self
	}

	/// Per-call timeout as a std duration, as expected by HTTP clients.
	pub fn timeout_std(&self) -> std::time::Duration {
		self.timeout.unsigned_abs()
	}

	/// Joins an endpoint path (optionally carrying a query) onto the base URL, preserving any
	/// base path prefix.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = format!("{base}/{}", path.trim_start_matches('/'));

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}
}
