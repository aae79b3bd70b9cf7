//! Backend endpoint paths and the set exempt from refresh interception.

/// Exchanges username/password for an access + refresh pair.
pub const LOGIN: &str = "/users/login";
/// Creates an account.
pub const REGISTER: &str = "/users/register";
/// Exchanges a refresh token for a new access token.
pub const TOKEN_REFRESH: &str = "/users/token/refresh/";
/// Best-effort server-side refresh token invalidation.
pub const LOGOUT: &str = "/users/logout/";
/// Triggers a password reset email.
pub const PASSWORD_RESET: &str = "/users/password-reset/";
/// Ride collection.
pub const RIDES: &str = "/rides/";

/// Endpoints used to obtain or renew credentials; a 401 from these never triggers a refresh.
pub const AUTH_ENDPOINTS: [&str; 3] = [LOGIN, REGISTER, TOKEN_REFRESH];

/// Returns `true` when `path` addresses one of [`AUTH_ENDPOINTS`].
///
/// Query strings and leading or trailing slashes are ignored, so `users/login`, `/users/login/`,
/// and `/users/login?next=x` all match.
pub fn is_auth_endpoint(path: &str) -> bool {
	let normalized = normalize(path);

	AUTH_ENDPOINTS.iter().any(|endpoint| normalize(endpoint) == normalized)
}

/// Path of a single ride action, e.g. `/rides/42/cancel/`.
pub fn ride_action(id: u64, action: &str) -> String {
	format!("{RIDES}{id}/{action}/")
}

fn normalize(path: &str) -> &str {
	let path = path.split(['?', '#']).next().unwrap_or_default();

	path.trim_matches('/')
}
