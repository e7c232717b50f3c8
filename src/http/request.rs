//! Replayable request descriptions handed to [`ApiHttpClient`](crate::http::ApiHttpClient)
//! transports.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";
/// Header naming the request body media type.
pub const CONTENT_TYPE: &str = "content-type";

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One file inside a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
	/// Multipart field name.
	pub field: String,
	/// File name reported to the server.
	pub file_name: String,
	/// MIME type of the payload.
	pub mime: String,
	/// File contents, shared so replays do not copy the payload.
	pub data: Arc<[u8]>,
}
impl Debug for FilePart {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FilePart")
			.field("field", &self.field)
			.field("file_name", &self.file_name)
			.field("mime", &self.mime)
			.field("len", &self.data.len())
			.finish()
	}
}

/// Request payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Pre-encoded bytes with their media type.
	Bytes {
		/// Media type sent as `content-type`.
		content_type: String,
		/// Encoded payload.
		data: Vec<u8>,
	},
	/// `multipart/form-data` parts; transports pick the boundary.
	Multipart(Vec<FilePart>),
}

/// Replayable description of one API call.
///
/// Requests are cheap to clone so a request suspended during a token refresh can be
/// dispatched again with the new credential.
#[derive(Clone)]
pub struct ApiRequest {
	method: Method,
	url: Url,
	headers: Vec<(String, String)>,
	body: RequestBody,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for an absolute URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: RequestBody::Empty, retried: false }
	}

	/// HTTP method.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Absolute target URL, including any query string.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Headers in insertion order; names are lowercase.
	pub fn headers(&self) -> &[(String, String)] {
		&self.headers
	}

	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Request payload.
	pub fn body(&self) -> &RequestBody {
		&self.body
	}

	/// Returns `true` once the request has been replayed after a token refresh.
	pub fn is_retry(&self) -> bool {
		self.retried
	}

	/// Sets (or replaces) a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.set_header(name.as_ref(), value.into());

		self
	}

	/// Appends query parameters to the URL.
	pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		{
			let mut query = self.url.query_pairs_mut();

			for (key, value) in pairs {
				query.append_pair(key.as_ref(), value.as_ref());
			}
		}

		if self.url.query() == Some("") {
			self.url.set_query(None);
		}

		self
	}

	/// Serializes `body` as JSON.
	pub fn with_json<T>(self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let data = serde_json::to_vec(body)?;

		Ok(self.with_bytes(JSON_MEDIA_TYPE, data))
	}

	/// Encodes `pairs` as `application/x-www-form-urlencoded`.
	pub fn with_form<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let encoded = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(pairs)
			.finish();

		self.with_bytes(FORM_MEDIA_TYPE, encoded.into_bytes())
	}

	/// Attaches raw bytes with the provided media type.
	pub fn with_bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
		let content_type = content_type.into();

		self.set_header(CONTENT_TYPE, content_type.clone());
		self.body = RequestBody::Bytes { content_type, data };

		self
	}

	/// Attaches multipart file parts.
	pub fn with_multipart(mut self, parts: Vec<FilePart>) -> Self {
		self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(CONTENT_TYPE));
		self.body = RequestBody::Multipart(parts);

		self
	}

	/// Returns a copy carrying `token` as its bearer credential, or no credential at all.
	pub(crate) fn authorized(&self, token: Option<&TokenSecret>) -> Self {
		let mut request = self.clone();

		match token {
			Some(token) => request.set_header(AUTHORIZATION, format!("Bearer {}", token.expose())),
			None => request.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(AUTHORIZATION)),
		}

		request
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}

	fn set_header(&mut self, name: &str, value: String) {
		let name = name.to_ascii_lowercase();

		match self.headers.iter_mut().find(|(key, _)| *key == name) {
			Some(slot) => slot.1 = value,
			None => self.headers.push((name, value)),
		}
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(key, value)| {
				let shown = if key == AUTHORIZATION { "<redacted>" } else { value.as_str() };

				(key.as_str(), shown)
			})
			.collect::<Vec<_>>();

		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body", &self.body)
			.field("retried", &self.retried)
			.finish()
	}
}
