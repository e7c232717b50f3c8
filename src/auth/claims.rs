//! Unverified JWT payload inspection for expiry bookkeeping.
//!
//! The backend signs its access and refresh tokens as JWTs carrying `sub`, `exp`, and a
//! `type` marker. The client never validates signatures; it only peeks at the payload to
//! report when the current access token stops being useful.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors raised while decoding a token payload.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClaimsError {
	/// The token does not have three dot-separated segments.
	#[error("Token is not a JWT.")]
	NotAJwt,
	/// The payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Encoding,
	/// The payload is not a JSON claims object.
	#[error("Token payload is not a JSON claims object: {message}.")]
	Payload {
		/// Parsing failure summary.
		message: String,
	},
}

/// Claims read from a token payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AccessClaims {
	/// Subject (user id), as issued.
	#[serde(default)]
	pub sub: Option<serde_json::Value>,
	/// Expiry as a Unix timestamp.
	#[serde(default)]
	pub exp: Option<i64>,
	/// Token kind marker (`access` or `refresh`).
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
}
impl AccessClaims {
	/// Decodes the payload of `token` without verifying its signature.
	pub fn peek(token: &TokenSecret) -> Result<Self, ClaimsError> {
		let mut segments = token.expose().split('.');
		let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
			(Some(_), Some(payload), Some(_), None) => payload,
			_ => return Err(ClaimsError::NotAJwt),
		};
		let bytes = URL_SAFE_NO_PAD
			.decode(payload.trim_end_matches('='))
			.map_err(|_| ClaimsError::Encoding)?;

		serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Payload { message: e.to_string() })
	}

	/// Expiry instant, when the token carries a representable `exp`.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
	}

	/// Returns `true` when the token has an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| expires_at <= instant)
	}
}
