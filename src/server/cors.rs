//! Fixed-origin CORS policy applied to every response.
//!
//! Unlike a negotiating CORS layer, the policy writes its headers unconditionally, whether or not
//! the request carried an `Origin`, and answers every `OPTIONS` request with `204 No Content`
//! before routing.

// crates.io
use axum::{
	extract::{Request, State},
	http::{
		HeaderMap, HeaderValue, Method,
		header::{
			ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
			ACCESS_CONTROL_ALLOW_ORIGIN,
		},
	},
	middleware::Next,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Methods advertised in `Access-Control-Allow-Methods`.
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS, PUT, DELETE";
/// Headers advertised in `Access-Control-Allow-Headers`.
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// CORS headers trusted for a single frontend origin.
#[derive(Clone, Debug)]
pub struct CorsPolicy {
	allow_origin: HeaderValue,
}
impl CorsPolicy {
	/// Creates a policy trusting `origin`.
	pub fn new(origin: &str) -> Result<Self, ConfigError> {
		let allow_origin = HeaderValue::from_str(origin).map_err(|source| {
			ConfigError::InvalidAllowedOrigin { origin: origin.to_owned(), source }
		})?;

		Ok(Self { allow_origin })
	}

	/// Writes the policy headers, replacing any already present.
	pub fn apply(&self, headers: &mut HeaderMap) {
		headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
		headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
		headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
	}
}

/// Middleware that short-circuits preflights and stamps the policy on every response.
pub async fn enforce(State(policy): State<CorsPolicy>, request: Request, next: Next) -> Response {
	let mut response = if request.method() == Method::OPTIONS {
		StatusCode::NO_CONTENT.into_response()
	} else {
		next.run(request).await
	};

	policy.apply(response.headers_mut());

	response
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn apply_overwrites_existing_headers() {
		let policy = CorsPolicy::new("http://localhost:4200").expect("Origin should be valid.");
		let mut headers = HeaderMap::new();

		headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
		policy.apply(&mut headers);

		assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:4200");
		assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
		assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
	}

	#[test]
	fn rejects_origin_with_control_characters() {
		let err = CorsPolicy::new("http://evil\n.example").expect_err("Newlines are not valid.");

		assert!(matches!(err, ConfigError::InvalidAllowedOrigin { .. }));
	}
}
