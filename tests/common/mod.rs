//! Helpers shared by the relay integration tests.

#![allow(dead_code)]

pub use std::time::Duration;

pub use axum::{body::Bytes, http::StatusCode};
pub use url::Url;

// crates.io
use axum::Router;
// self
use dropbox_token_relay::{
	config::{RelayConfig, RelaySettings},
	server,
};

/// Client identifier injected by test relays.
pub const TEST_CLIENT_ID: &str = "relay-client";
/// Client secret injected by test relays.
pub const TEST_CLIENT_SECRET: &str = "relay-secret";
/// Redirect URI injected by test relays.
pub const TEST_REDIRECT_URI: &str = "http://localhost:4200/callback";

/// Credentials shared by every test relay.
pub fn test_relay_config() -> RelayConfig {
	RelayConfig::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REDIRECT_URI)
}

/// Default settings with the token endpoint swapped for `token_endpoint`.
pub fn test_relay_settings(token_endpoint: &str) -> RelaySettings {
	let endpoint = Url::parse(token_endpoint).expect("Failed to parse test token endpoint URL.");

	RelaySettings::dropbox()
		.expect("Failed to build default relay settings.")
		.with_token_endpoint(endpoint)
}

/// Builds the full relay router (CORS + tracing layers included) from `settings`.
pub fn build_test_router_with(settings: &RelaySettings) -> Router {
	server::app(test_relay_config(), settings).expect("Failed to build test relay router.")
}

/// Builds the full relay router pointed at `token_endpoint`.
pub fn build_test_router(token_endpoint: &str) -> Router {
	build_test_router_with(&test_relay_settings(token_endpoint))
}
