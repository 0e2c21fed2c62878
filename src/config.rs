//! Process configuration.
//!
//! [`RelayConfig`] holds the confidential client credentials read once from the environment;
//! [`RelaySettings`] holds the listener and upstream settings, which default to the fixed
//! Dropbox deployment values. Both are immutable once the listener starts and are shared with
//! request handlers by handle.

// std
use std::net::{IpAddr, Ipv4Addr};
// self
use crate::{_prelude::*, error::ConfigError, secret::Secret};

/// Environment variable carrying the OAuth client identifier.
pub const CLIENT_ID_VAR: &str = "DROPBOX_CLIENT_ID";
/// Environment variable carrying the OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "DROPBOX_CLIENT_SECRET";
/// Environment variable carrying the registered redirect URI.
pub const REDIRECT_URI_VAR: &str = "DROPBOX_REDIRECT_URI";

/// Dropbox token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.dropboxapi.com/oauth2/token";
/// Frontend origin trusted by the CORS policy.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:4200";
/// Listener address (all interfaces, port 3000).
pub const DEFAULT_BIND_ADDR: SocketAddr =
	SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
/// Upper bound for a single token endpoint call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);
/// Grace period granted to in-flight requests on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Server-held client credentials injected into every token request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Redirect URI registered with the provider; sent on authorization-code exchanges.
	pub redirect_uri: String,
}
impl RelayConfig {
	/// Creates a configuration from explicit values.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			redirect_uri: redirect_uri.into(),
		}
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// Variables are checked in a fixed order (client identifier, client secret, redirect URI)
	/// and the first unset or empty one is reported.
	pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
	where
		F: FnMut(&str) -> Option<String>,
	{
		let client_id = require(&mut lookup, CLIENT_ID_VAR)?;
		let client_secret = require(&mut lookup, CLIENT_SECRET_VAR)?;
		let redirect_uri = require(&mut lookup, REDIRECT_URI_VAR)?;

		Ok(Self::new(client_id, client_secret, redirect_uri))
	}
}

/// Listener and upstream settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelaySettings {
	/// Address the HTTP listener binds.
	pub bind_addr: SocketAddr,
	/// Token endpoint every grant is forwarded to.
	pub token_endpoint: Url,
	/// Origin written into `Access-Control-Allow-Origin`.
	pub allowed_origin: String,
	/// Timeout applied to each token endpoint call.
	pub upstream_timeout: Duration,
	/// Grace period for in-flight requests after a termination signal.
	pub shutdown_grace: Duration,
}
impl RelaySettings {
	/// Settings for the Dropbox deployment.
	pub fn dropbox() -> Result<Self, ConfigError> {
		let token_endpoint = Url::parse(DEFAULT_TOKEN_ENDPOINT)
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;

		Ok(Self {
			bind_addr: DEFAULT_BIND_ADDR,
			token_endpoint,
			allowed_origin: DEFAULT_ALLOWED_ORIGIN.into(),
			upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
			shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
		})
	}

	/// Overrides the listener address.
	pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
		self.bind_addr = addr;

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_endpoint(mut self, endpoint: Url) -> Self {
		self.token_endpoint = endpoint;

		self
	}

	/// Overrides the trusted frontend origin.
	pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
		self.allowed_origin = origin.into();

		self
	}

	/// Overrides the upstream call timeout.
	pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
		self.upstream_timeout = timeout;

		self
	}

	/// Overrides the shutdown grace period.
	pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
		self.shutdown_grace = grace;

		self
	}
}

fn require<F>(lookup: &mut F, name: &'static str) -> Result<String, ConfigError>
where
	F: FnMut(&str) -> Option<String>,
{
	lookup(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingVariable { name })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup_from<'a>(
		pairs: &'a [(&'a str, &'a str)],
	) -> impl FnMut(&str) -> Option<String> + 'a {
		let vars: HashMap<_, _> = pairs.iter().copied().collect();

		move |name| vars.get(name).map(|value| (*value).to_owned())
	}

	fn missing_name(result: Result<RelayConfig, ConfigError>) -> &'static str {
		match result {
			Err(ConfigError::MissingVariable { name }) => name,
			other => panic!("Expected a missing variable error, got {other:?}."),
		}
	}

	#[test]
	fn loads_all_three_variables() {
		let config = RelayConfig::from_lookup(lookup_from(&[
			(CLIENT_ID_VAR, "id"),
			(CLIENT_SECRET_VAR, "secret"),
			(REDIRECT_URI_VAR, "http://localhost:4200/callback"),
		]))
		.expect("Complete environment should load.");

		assert_eq!(config.client_id, "id");
		assert_eq!(config.client_secret.expose(), "secret");
		assert_eq!(config.redirect_uri, "http://localhost:4200/callback");
	}

	#[test]
	fn first_missing_variable_wins() {
		assert_eq!(missing_name(RelayConfig::from_lookup(lookup_from(&[]))), CLIENT_ID_VAR);
		assert_eq!(
			missing_name(RelayConfig::from_lookup(lookup_from(&[(REDIRECT_URI_VAR, "uri")]))),
			CLIENT_ID_VAR
		);
		assert_eq!(
			missing_name(RelayConfig::from_lookup(lookup_from(&[
				(CLIENT_ID_VAR, "id"),
				(REDIRECT_URI_VAR, "uri"),
			]))),
			CLIENT_SECRET_VAR
		);
		assert_eq!(
			missing_name(RelayConfig::from_lookup(lookup_from(&[
				(CLIENT_ID_VAR, "id"),
				(CLIENT_SECRET_VAR, "secret"),
			]))),
			REDIRECT_URI_VAR
		);
	}

	#[test]
	fn empty_values_count_as_missing() {
		let result = RelayConfig::from_lookup(lookup_from(&[
			(CLIENT_ID_VAR, "id"),
			(CLIENT_SECRET_VAR, ""),
			(REDIRECT_URI_VAR, "uri"),
		]));

		assert_eq!(missing_name(result), CLIENT_SECRET_VAR);
	}

	#[test]
	fn missing_variable_error_names_the_variable() {
		let err = ConfigError::MissingVariable { name: REDIRECT_URI_VAR };

		assert_eq!(err.to_string(), "Missing required environment variable: DROPBOX_REDIRECT_URI.");
	}

	#[test]
	fn config_debug_redacts_client_secret() {
		let config = RelayConfig::new("id", "very-secret", "uri");

		assert!(!format!("{config:?}").contains("very-secret"));
	}

	#[test]
	fn dropbox_settings_use_fixed_defaults() {
		let settings = RelaySettings::dropbox().expect("Default settings should build.");

		assert_eq!(settings.bind_addr.port(), 3000);
		assert!(settings.bind_addr.ip().is_unspecified());
		assert_eq!(settings.token_endpoint.as_str(), DEFAULT_TOKEN_ENDPOINT);
		assert_eq!(settings.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
		assert_eq!(settings.upstream_timeout, Duration::from_secs(10));
		assert_eq!(settings.shutdown_grace, Duration::from_secs(5));
	}
}
