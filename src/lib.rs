//! Stateless relay that trades Dropbox OAuth authorization codes and refresh tokens on behalf of
//! browser clients, keeping the confidential client secret on the server.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod lifecycle;
pub mod obs;
pub mod relay;
pub mod secret;
pub mod server;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		net::SocketAddr,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use axum::{body::Bytes, http::StatusCode};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::Result;
}

pub use reqwest;
pub use url;
use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
