//! Relay-level error types shared by configuration, transport, request parsing, and lifecycle.

// std
use std::io::Error as IoError;
// crates.io
use axum::http::header::InvalidHeaderValue;
use tokio::task::JoinError;
// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint could not be reached or its response could not be read.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Inbound request body does not match the expected grant payload.
	#[error(transparent)]
	RequestBody(#[from] RequestBodyError),
	/// Listener or shutdown failure; fatal for the process.
	#[error(transparent)]
	Lifecycle(#[from] LifecycleError),
}

/// Configuration and validation failures raised before the listener starts.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is unset or empty.
	#[error("Missing required environment variable: {name}.")]
	MissingVariable {
		/// Name of the first missing variable.
		name: &'static str,
	},
	/// Token endpoint cannot be parsed.
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Allowed CORS origin is not a valid header value.
	#[error("Allowed origin `{origin}` is not a valid header value.")]
	InvalidAllowedOrigin {
		/// Rejected origin string.
		origin: String,
		/// Underlying header validation failure.
		#[source]
		source: InvalidHeaderValue,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures while calling the token endpoint. None of them are retried.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The call exceeded the upstream timeout.
	#[error("Timed out while calling the token endpoint.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// DNS, TCP, or TLS failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The response arrived but its body could not be read to the end.
	#[error("Token endpoint response body could not be read.")]
	Body {
		/// Transport-specific body error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific body read error.
	pub fn body(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Body { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_body() || e.is_decode() {
			Self::body(e)
		} else {
			Self::network(e)
		}
	}
}

/// Inbound body that cannot be decoded into the grant payload.
#[derive(Debug, ThisError)]
pub enum RequestBodyError {
	/// The body could not be read, for example because it exceeded the size limit.
	#[error("Request body could not be read.")]
	Unreadable {
		/// Extractor rejection describing the read failure.
		#[source]
		source: BoxError,
	},
	/// The body holds no JSON value.
	#[error("Request body is empty.")]
	Empty,
	/// The first JSON value in the body is not well formed.
	#[error("Request body is not valid JSON.")]
	Syntax(#[source] serde_json::Error),
	/// The top-level JSON value is neither an object nor `null`.
	#[error("Request body must be a JSON object, found {found}.")]
	NotAnObject {
		/// Kind of JSON value found at the root.
		found: &'static str,
	},
	/// A known field holds a value of the wrong type.
	#[error("Request body field has the wrong type.")]
	Field {
		/// Decoding failure along with the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl RequestBodyError {
	/// Wraps a failure to read the inbound body.
	pub fn unreadable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Unreadable { source: Box::new(src) }
	}

	/// JSON path at which decoding failed (`.` for the document root).
	pub fn path(&self) -> String {
		match self {
			Self::Field { source } => source.path().to_string(),
			_ => ".".into(),
		}
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for RequestBodyError {
	fn from(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Field { source }
	}
}

/// Listener and shutdown failures.
#[derive(Debug, ThisError)]
pub enum LifecycleError {
	/// The listener could not bind its address.
	#[error("Failed to bind listener on {addr}.")]
	Bind {
		/// Address the listener attempted to bind.
		addr: SocketAddr,
		/// Underlying socket failure.
		#[source]
		source: IoError,
	},
	/// Termination signal handlers could not be installed.
	#[error("Failed to install termination signal handlers.")]
	Signal(#[source] IoError),
	/// The HTTP server stopped with an I/O failure.
	#[error("HTTP server failed.")]
	Serve(#[source] IoError),
	/// The HTTP server task panicked or was cancelled.
	#[error("HTTP server task terminated abnormally.")]
	ServerTask(#[from] JoinError),
	/// In-flight requests were still running when the grace period elapsed.
	#[error("Graceful shutdown did not complete within {grace:?}.")]
	ShutdownTimeout {
		/// Grace period that elapsed.
		grace: Duration,
	},
}
