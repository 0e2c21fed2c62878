//! Grant relay: turns a decoded grant payload into one token endpoint call.
//!
//! [`Relay`] owns the read-only client credentials, the token endpoint, and the shared HTTP
//! transport. Each call builds a fresh form, posts it exactly once, and returns the upstream
//! status and body untouched. Upstream error statuses are not relay errors; only a failure to
//! obtain a response is.

// self
use crate::{
	_prelude::*,
	config::{RelayConfig, RelaySettings},
	error::TransportError,
	grant::{AuthorizationCodeRequest, GrantRequest, RefreshRequest},
	http::{ReqwestTokenClient, TokenEndpointClient, UpstreamResponse},
	obs::{self, RelayOutcome, RelaySpan},
};

/// Relay specialized for the crate's default reqwest transport.
pub type ReqwestRelay = Relay<ReqwestTokenClient>;

/// Forwards grants to a single token endpoint with server-held credentials.
pub struct Relay<C = ReqwestTokenClient>
where
	C: ?Sized + TokenEndpointClient,
{
	/// Client credentials injected into every form.
	pub config: Arc<RelayConfig>,
	/// Token endpoint every grant is posted to.
	pub token_endpoint: Url,
	/// HTTP transport shared by all in-flight requests.
	pub http_client: Arc<C>,
}
impl<C> Relay<C>
where
	C: ?Sized + TokenEndpointClient,
{
	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(
		config: impl Into<Arc<RelayConfig>>,
		token_endpoint: Url,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { config: config.into(), token_endpoint, http_client: http_client.into() }
	}

	/// Relays an authorization-code exchange.
	pub async fn exchange_code(
		&self,
		request: AuthorizationCodeRequest,
	) -> Result<UpstreamResponse, TransportError> {
		self.relay(request, "exchange_code").await
	}

	/// Relays a refresh-token exchange.
	pub async fn refresh(&self, request: RefreshRequest) -> Result<UpstreamResponse, TransportError> {
		self.relay(request, "refresh").await
	}

	/// Relays any grant payload; the two endpoints share this path.
	pub async fn relay<G>(
		&self,
		request: G,
		stage: &'static str,
	) -> Result<UpstreamResponse, TransportError>
	where
		G: GrantRequest,
	{
		let span = RelaySpan::new(G::GRANT, stage);

		obs::record_grant_outcome(G::GRANT, RelayOutcome::Attempt);

		span.instrument(async move {
			let form = request.into_form(&self.config);

			match self.http_client.post_form(&self.token_endpoint, &form).await {
				Ok(response) => {
					tracing::debug!(
						status = response.status.as_u16(),
						bytes = response.body.len(),
						"Relaying token endpoint response."
					);
					obs::record_grant_outcome(G::GRANT, RelayOutcome::Passthrough);

					Ok(response)
				},
				Err(e) => {
					tracing::warn!(error = %e, "Token endpoint is unreachable.");
					obs::record_grant_outcome(G::GRANT, RelayOutcome::Unreachable);

					Err(e)
				},
			}
		})
		.await
	}
}
impl Relay<ReqwestTokenClient> {
	/// Creates a relay with a reqwest transport bounded by the configured upstream timeout.
	pub fn new(config: impl Into<Arc<RelayConfig>>, settings: &RelaySettings) -> Result<Self> {
		let http_client = ReqwestTokenClient::with_timeout(settings.upstream_timeout)?;

		Ok(Self::with_http_client(config, settings.token_endpoint.clone(), http_client))
	}
}
impl<C> Clone for Relay<C>
where
	C: ?Sized + TokenEndpointClient,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			token_endpoint: self.token_endpoint.clone(),
			http_client: Arc::clone(&self.http_client),
		}
	}
}
impl<C> Debug for Relay<C>
where
	C: ?Sized + TokenEndpointClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("client_id", &self.config.client_id)
			.field("token_endpoint", &self.token_endpoint.as_str())
			.finish()
	}
}
