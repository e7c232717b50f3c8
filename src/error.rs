//! Client-level error types shared across the session, transport, store, and resource layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The API answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// The API answered with a body that does not match the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Upload input could not be prepared.
	#[error(transparent)]
	Upload(#[from] UploadError),
	/// The session could not be recovered; credentials were cleared.
	#[error("Session expired: {0}")]
	SessionExpired(#[from] RefreshFailure),
}
impl Error {
	/// Returns the HTTP status attached to the failure, when the API produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(err) => Some(err.status),
			Self::Decode(err) => Some(err.status),
			Self::SessionExpired(RefreshFailure::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the failure ended the authenticated session.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired(_))
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Configuration field name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than http or https.
	#[error("The {field} URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Configuration field name.
		field: &'static str,
		/// Offending scheme.
		scheme: String,
	},
	/// A configured URL cannot carry path segments.
	#[error("The {field} URL cannot be used as a base.")]
	CannotBeABase {
		/// Configuration field name.
		field: &'static str,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
	/// An environment variable holds an unusable value.
	#[error("Environment variable {name} is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// A request path could not be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request to the API timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
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
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Non-success response returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("API request failed with status {status}{}.", detail_suffix(.detail))]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// `detail` field of the error payload, when present.
	pub detail: Option<String>,
	/// `message` field of the error payload, when present.
	pub message: Option<String>,
	/// Retry-After hint from the API, if supplied.
	pub retry_after: Option<Duration>,
}
impl ApiError {
	/// Returns `true` for HTTP 401 responses.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}
}

fn detail_suffix(detail: &Option<String>) -> String {
	detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Response body failed to decode into the requested type.
#[derive(Debug, ThisError)]
#[error("API response with status {status} could not be decoded.")]
pub struct DecodeError {
	/// HTTP status code of the response.
	pub status: u16,
	/// Structured parsing failure including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Upload preparation failures.
#[derive(Debug, ThisError)]
pub enum UploadError {
	/// The path or URL does not point at an uploaded file.
	#[error("Upload path `{input}` is invalid.")]
	InvalidFilePath {
		/// Raw caller input.
		input: String,
	},
	/// A local file could not be read for upload.
	#[error("Failed to read upload source {path}.")]
	Read {
		/// Local path that failed.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}

/// Terminal refresh failure shared with every request waiting on the same refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RefreshFailure {
	/// No refresh token was stored.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// The refresh endpoint rejected the refresh token.
	#[error("Refresh endpoint rejected the refresh token with status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// `detail` field of the error payload, when present.
		detail: Option<String>,
	},
	/// The refresh call failed before a response arrived.
	#[error("Refresh call failed: {message}.")]
	Transport {
		/// Transport failure summary.
		message: String,
	},
	/// The refresh endpoint answered with an unusable payload.
	#[error("Refresh endpoint returned a malformed response: {message}.")]
	MalformedResponse {
		/// Parsing failure summary.
		message: String,
	},
	/// Rotated credentials could not be persisted.
	#[error("Refreshed credentials could not be stored: {message}.")]
	Storage {
		/// Store failure summary.
		message: String,
	},
	/// The task driving the refresh was dropped before it settled.
	#[error("Refresh was abandoned before it completed.")]
	Abandoned,
	/// The owner logged out while the refresh was running.
	#[error("Session ended while the refresh was running.")]
	SessionEnded,
}
impl RefreshFailure {
	/// Returns `true` when stored credentials are wiped for this failure.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Abandoned | Self::SessionEnded)
	}
}
