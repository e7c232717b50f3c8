//! Buffered API responses and error-payload extraction.

// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ApiError, DecodeError},
};

/// Fully buffered HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	status: u16,
	headers: Vec<(String, String)>,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response; header names are stored lowercase.
	pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
		let headers =
			headers.into_iter().map(|(key, value)| (key.to_ascii_lowercase(), value)).collect();

		Self { status, headers, body }
	}

	/// Creates a JSON response.
	pub fn json(status: u16, value: &serde_json::Value) -> Self {
		Self::new(
			status,
			vec![("content-type".into(), "application/json".into())],
			value.to_string().into_bytes(),
		)
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON; an empty body decodes as `null`.
	pub fn json_body<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
			b"null"
		} else {
			&self.body
		};
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { status: self.status, source })
	}

	/// Parses the Retry-After header as either delta-seconds or an HTTP date.
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.header("retry-after")?.trim();

		if let Ok(secs) = raw.parse::<u64>() {
			return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
		}
		if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
			let delta = moment - OffsetDateTime::now_utc();

			if delta.is_positive() {
				return Some(delta);
			}
		}

		None
	}

	/// Builds the [`ApiError`] describing this (non-success) response.
	pub fn to_api_error(&self) -> ApiError {
		let payload =
			self.json_body::<Option<ErrorPayload>>().ok().flatten().unwrap_or_default();

		ApiError {
			status: self.status,
			detail: payload.detail.map(render_detail),
			message: payload.message,
			retry_after: self.retry_after(),
		}
	}

	/// Returns `self` for 2xx statuses and an [`ApiError`] otherwise.
	pub fn error_for_status(self) -> Result<Self, ApiError> {
		if self.is_success() { Ok(self) } else { Err(self.to_api_error()) }
	}
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
	#[serde(default)]
	detail: Option<serde_json::Value>,
	#[serde(default)]
	message: Option<String>,
}

// FastAPI validation failures carry `detail` as a list of objects.
fn render_detail(detail: serde_json::Value) -> String {
	match detail {
		serde_json::Value::String(text) => text,
		serde_json::Value::Array(items) => items
			.iter()
			.map(|item| match item.get("msg").and_then(serde_json::Value::as_str) {
				Some(msg) => msg.to_owned(),
				None => item.to_string(),
			})
			.collect::<Vec<_>>()
			.join("; "),
		other => other.to_string(),
	}
}
