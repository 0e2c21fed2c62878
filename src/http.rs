//! Transport primitives for token endpoint calls.
//!
//! The module exposes [`TokenEndpointClient`] alongside [`UpstreamResponse`] so the relay can
//! run against any HTTP stack. The default [`ReqwestTokenClient`] posts the form once, reads the
//! body to the end, and hands back the status and raw bytes without interpreting them.

// crates.io
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	grant::TokenForm,
};

/// Boxed future returned by [`TokenEndpointClient::post_form`].
pub type TokenFuture<'a> =
	Pin<Box<dyn Future<Output = Result<UpstreamResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting a token form.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by every
/// in-flight request. A call is attempted exactly once; implementations must not retry and
/// must release the connection once the body has been read or the call has failed.
pub trait TokenEndpointClient
where
	Self: 'static + Send + Sync,
{
	/// Posts `form` as `application/x-www-form-urlencoded` to `endpoint`.
	///
	/// Any HTTP response, successful or not, resolves to `Ok`. Only failures to obtain a
	/// complete response resolve to [`TransportError`].
	fn post_form<'a>(&'a self, endpoint: &'a Url, form: &'a TokenForm) -> TokenFuture<'a>;
}

/// Status code and raw body returned by the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
	/// Upstream HTTP status.
	pub status: StatusCode,
	/// Upstream body, byte-for-byte.
	pub body: Bytes,
}
impl UpstreamResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests do not follow redirects; a 3xx from the token endpoint is relayed like any
/// other status. Configure any custom [`ReqwestClient`] the same way.
#[derive(Clone, Debug)]
pub struct ReqwestTokenClient(pub ReqwestClient);
impl ReqwestTokenClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client bounded by `timeout` per call, with redirects disabled.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}
}
impl TokenEndpointClient for ReqwestTokenClient {
	fn post_form<'a>(&'a self, endpoint: &'a Url, form: &'a TokenForm) -> TokenFuture<'a> {
		Box::pin(async move {
			let response = self.0.post(endpoint.clone()).form(form).send().await?;
			let status = response.status();
			// Reading to the end hands the connection back to the pool.
			let body = response.bytes().await?;

			Ok(UpstreamResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builds_client_with_timeout() {
		let client = ReqwestTokenClient::with_timeout(Duration::from_secs(10));

		assert!(client.is_ok());
	}

	#[tokio::test]
	async fn unreachable_endpoint_maps_to_transport_error() {
		let client = ReqwestTokenClient::with_timeout(Duration::from_secs(2))
			.expect("Failed to build reqwest token client.");
		let endpoint =
			Url::parse("http://127.0.0.1:1/token").expect("Failed to parse unreachable endpoint.");
		let form = TokenForm::from([("grant_type", "refresh_token".to_owned())]);
		let err = client
			.post_form(&endpoint, &form)
			.await
			.expect_err("Connecting to a closed port should fail.");

		assert!(
			matches!(err, TransportError::Network { .. } | TransportError::Timeout { .. }),
			"Unexpected transport error: {err:?}."
		);
	}
}
