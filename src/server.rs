//! HTTP surface: the two grant endpoints, error bodies, and the middleware stack.

pub mod cors;

pub use cors::CorsPolicy;

// crates.io
use axum::{
	Json, Router,
	extract::{State, rejection::BytesRejection},
	http::{HeaderValue, header::CONTENT_TYPE},
	middleware,
	response::{IntoResponse, Response},
	routing::post,
};
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::{RelayConfig, RelaySettings},
	error::{RequestBodyError, TransportError},
	grant::{self, AuthorizationCodeRequest, GrantRequest, RefreshRequest},
	http::{TokenEndpointClient, UpstreamResponse},
	obs::{self, RelayOutcome},
	relay::Relay,
};

/// Authorization-code exchange route.
pub const EXCHANGE_PATH: &str = "/api/dropbox/exchange";
/// Refresh-token exchange route.
pub const REFRESH_PATH: &str = "/api/dropbox/refresh";

/// Builds the production router from configuration: reqwest transport, CORS, and tracing.
pub fn app(config: RelayConfig, settings: &RelaySettings) -> Result<Router> {
	let relay = Relay::new(config, settings)?;
	let cors = CorsPolicy::new(&settings.allowed_origin)?;

	Ok(router(relay, cors))
}

/// Builds the router around an existing relay.
///
/// The CORS middleware wraps every route and both fallbacks, so preflights to any path are
/// answered before routing and error responses still carry the policy headers. Unknown paths
/// and non-`POST` methods on the grant routes answer with JSON error bodies.
pub fn router<C>(relay: Relay<C>, cors: CorsPolicy) -> Router
where
	C: ?Sized + TokenEndpointClient,
{
	Router::new()
		.route(EXCHANGE_PATH, post(relay_grant::<C, AuthorizationCodeRequest>))
		.route(REFRESH_PATH, post(relay_grant::<C, RefreshRequest>))
		.method_not_allowed_fallback(method_not_allowed)
		.fallback(not_found)
		.with_state(relay)
		.layer(middleware::from_fn_with_state(cors, cors::enforce))
		.layer(TraceLayer::new_for_http())
}

/// Error responses produced by the relay itself, each rendered as `{"error": "<message>"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiError {
	/// Inbound JSON could not be decoded (400).
	InvalidRequestBody,
	/// The token endpoint could not be reached (502).
	UpstreamUnreachable,
	/// No route matched (404).
	NotFound,
	/// The route exists but only accepts `POST` (405).
	MethodNotAllowed,
}
impl ApiError {
	/// HTTP status for the error.
	pub const fn status(self) -> StatusCode {
		match self {
			ApiError::InvalidRequestBody => StatusCode::BAD_REQUEST,
			ApiError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
			ApiError::NotFound => StatusCode::NOT_FOUND,
			ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
		}
	}

	/// Message written into the `error` field.
	pub const fn message(self) -> &'static str {
		match self {
			ApiError::InvalidRequestBody => "invalid request body",
			ApiError::UpstreamUnreachable => "failed to contact dropbox",
			ApiError::NotFound => "not found",
			ApiError::MethodNotAllowed => "method not allowed",
		}
	}
}
impl From<RequestBodyError> for ApiError {
	fn from(_: RequestBodyError) -> Self {
		Self::InvalidRequestBody
	}
}
impl From<TransportError> for ApiError {
	fn from(_: TransportError) -> Self {
		Self::UpstreamUnreachable
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status(), Json(ErrorBody { error: self.message() })).into_response()
	}
}

#[derive(Serialize)]
struct ErrorBody {
	error: &'static str,
}

impl IntoResponse for UpstreamResponse {
	fn into_response(self) -> Response {
		let content_type = HeaderValue::from_static("application/json");

		(self.status, [(CONTENT_TYPE, content_type)], self.body).into_response()
	}
}

async fn relay_grant<C, G>(
	State(relay): State<Relay<C>>,
	body: Result<Bytes, BytesRejection>,
) -> Result<UpstreamResponse, ApiError>
where
	C: ?Sized + TokenEndpointClient,
	G: GrantRequest,
{
	let request = body
		.map_err(RequestBodyError::unreadable)
		.and_then(|body| grant::parse::<G>(&body))
		.map_err(|e| {
			tracing::debug!(
				grant = %G::GRANT,
				path = %e.path(),
				error = %e,
				"Rejected malformed request body."
			);
			obs::record_grant_outcome(G::GRANT, RelayOutcome::Rejected);

			e
		})?;
	let stage = match G::GRANT {
		grant::GrantType::AuthorizationCode => "exchange_endpoint",
		grant::GrantType::RefreshToken => "refresh_endpoint",
	};

	Ok(relay.relay(request, stage).await?)
}

async fn not_found() -> ApiError {
	ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
	ApiError::MethodNotAllowed
}
