//! Session credential pair and the token response issued by login and refresh.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Token response returned by `/auth/login` and `/auth/refresh`.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Rotated refresh token, when the backend issued one.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Token type label, normally `bearer`.
	#[serde(default = "default_token_type")]
	pub token_type: String,
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.finish()
	}
}

fn default_token_type() -> String {
	"bearer".into()
}

/// Credentials held by one session.
///
/// Either half may be missing: a store can be hydrated from a partially written snapshot,
/// and an anonymous session has neither.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
	/// Bearer credential attached to outgoing requests.
	pub access_token: Option<TokenSecret>,
	/// Credential used solely to obtain a new access token.
	pub refresh_token: Option<TokenSecret>,
}
impl Credentials {
	/// Creates a full credential pair.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: Some(TokenSecret::new(access_token)),
			refresh_token: Some(TokenSecret::new(refresh_token)),
		}
	}

	/// Returns `true` when neither token is present.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}

	/// Replaces the credentials with a freshly issued pair.
	///
	/// The previous refresh token is kept when the backend did not rotate it.
	pub fn rotate(&self, issued: TokenPair) -> Self {
		Self {
			access_token: Some(issued.access_token),
			refresh_token: issued.refresh_token.or_else(|| self.refresh_token.clone()),
		}
	}
}
impl From<TokenPair> for Credentials {
	fn from(pair: TokenPair) -> Self {
		Self { access_token: Some(pair.access_token), refresh_token: pair.refresh_token }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}
