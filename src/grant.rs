//! Inbound grant payloads and the token endpoint form each one expands into.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, config::RelayConfig, error::RequestBodyError, secret::Secret};

/// Form parameters for a single token endpoint call, keyed by parameter name.
pub type TokenForm = BTreeMap<&'static str, String>;

/// OAuth 2.0 grants relayed to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// `grant_type=authorization_code`.
	AuthorizationCode,
	/// `grant_type=refresh_token`.
	RefreshToken,
}
impl GrantType {
	/// Returns the `grant_type` form value, also used as a span/metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Inbound payload that expands into a token endpoint form.
pub trait GrantRequest
where
	Self: 'static + Send + DeserializeOwned,
{
	/// Grant relayed by this payload.
	const GRANT: GrantType;

	/// Builds the upstream form, injecting the server-held credentials from `config`.
	fn into_form(self, config: &RelayConfig) -> TokenForm;
}

/// `POST /api/dropbox/exchange` payload.
///
/// A missing `code` decodes to the empty string and is forwarded as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorizationCodeRequest {
	/// Authorization code returned to the frontend by the provider.
	#[serde(default)]
	pub code: Secret,
}
impl GrantRequest for AuthorizationCodeRequest {
	const GRANT: GrantType = GrantType::AuthorizationCode;

	fn into_form(self, config: &RelayConfig) -> TokenForm {
		let mut form = client_form(Self::GRANT, config);

		form.insert("code", self.code.expose().to_owned());
		form.insert("redirect_uri", config.redirect_uri.clone());

		form
	}
}

/// `POST /api/dropbox/refresh` payload.
///
/// A missing `refresh_token` decodes to the empty string and is forwarded as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RefreshRequest {
	/// Refresh token previously issued to the frontend.
	#[serde(default)]
	pub refresh_token: Secret,
}
impl GrantRequest for RefreshRequest {
	const GRANT: GrantType = GrantType::RefreshToken;

	// The refresh grant carries no redirect_uri.
	fn into_form(self, config: &RelayConfig) -> TokenForm {
		let mut form = client_form(Self::GRANT, config);

		form.insert("refresh_token", self.refresh_token.expose().to_owned());

		form
	}
}

/// Decodes an inbound JSON body into `G`, recording the path of the first mismatch.
///
/// Only the first JSON value in the body is read; anything after it is ignored. A `null` root
/// decodes like `{}`, a `null` field keeps its default, and the last of duplicate keys wins.
/// Any other root value is rejected.
pub fn parse<G>(body: &[u8]) -> Result<G, RequestBodyError>
where
	G: GrantRequest,
{
	let root = serde_json::Deserializer::from_slice(body)
		.into_iter::<Value>()
		.next()
		.ok_or(RequestBodyError::Empty)?
		.map_err(RequestBodyError::Syntax)?;
	let mut fields = match root {
		Value::Object(fields) => fields,
		Value::Null => Map::new(),
		other => return Err(RequestBodyError::NotAnObject { found: json_kind(&other) }),
	};

	fields.retain(|_, value| !value.is_null());

	Ok(serde_path_to_error::deserialize(Value::Object(fields))?)
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn client_form(grant: GrantType, config: &RelayConfig) -> TokenForm {
	let mut form = TokenForm::new();

	form.insert("grant_type", grant.as_str().to_owned());
	form.insert("client_id", config.client_id.clone());
	form.insert("client_secret", config.client_secret.expose().to_owned());

	form
}
