//! Runs the Dropbox token relay on port 3000 until SIGINT or SIGTERM.

// crates.io
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
// self
use dropbox_token_relay::{
	config::{RelayConfig, RelaySettings},
	lifecycle, server,
};

const DEFAULT_LOG_FILTER: &str = "dropbox_token_relay=info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
		)
		.init();

	let config = RelayConfig::from_env()?;
	let settings = RelaySettings::dropbox()?;
	let app = server::app(config, &settings)?;
	let listener = lifecycle::bind(settings.bind_addr).await?;
	let shutdown = lifecycle::shutdown_signal()?;

	lifecycle::serve_until(listener, app, shutdown, settings.shutdown_grace).await?;

	Ok(())
}
