//! Client configuration: API endpoints, transport timeout, and session policies.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

const DEFAULT_BASE_URL: &str = "http://localhost:8006/api/v1";
const DEFAULT_UPLOADS_URL: &str = "http://localhost:8006/uploads";
const DEFAULT_REDIRECT: &str = "/login";
const DEFAULT_TIMEOUT: Duration = Duration::seconds(30);
const API_PREFIX: &str = "/api/v1";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "PORTFOLIO_API_BASE_URL";
/// Environment variable overriding the request timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "PORTFOLIO_API_TIMEOUT_MS";
/// Environment variable overriding the public uploads URL.
pub const ENV_UPLOADS_URL: &str = "PORTFOLIO_UPLOADS_URL";

/// Which store entries a terminal refresh failure removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WipePolicy {
	/// Remove only the access and refresh token entries.
	#[default]
	AuthKeys,
	/// Clear every entry in the store, including unrelated application state.
	Everything,
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API base URL; always ends with `/` so relative paths join beneath it.
	pub base_url: Url,
	/// Public base URL that serves uploaded files.
	pub uploads_url: Url,
	/// Per-request timeout applied by the transport.
	pub timeout: Duration,
	/// Store entries removed when the session cannot be recovered.
	pub wipe_policy: WipePolicy,
	/// Sign-in location announced when the session expires.
	pub redirect_to: String,
}
impl ClientConfig {
	/// Returns a builder seeded with local development defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a configuration from `PORTFOLIO_*` environment variables, falling back to
	/// defaults for unset variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::builder().with_env()?.build()
	}

	/// Resolves a request path (leading slash optional) against the API base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}

	/// Returns the server origin that hosts the API, with a trailing `/api/v1` removed.
	pub fn api_origin(&self) -> Url {
		let mut origin = self.base_url.clone();
		let path = origin.path().trim_end_matches('/');
		let trimmed = path.strip_suffix(API_PREFIX).unwrap_or(path).to_owned();

		origin.set_path(&format!("{trimmed}/"));
		origin.set_query(None);

		origin
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: normalize_base(parse_default(DEFAULT_BASE_URL)),
			uploads_url: parse_default(DEFAULT_UPLOADS_URL),
			timeout: DEFAULT_TIMEOUT,
			wipe_policy: WipePolicy::default(),
			redirect_to: DEFAULT_REDIRECT.into(),
		}
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<Url>,
	uploads_url: Option<Url>,
	timeout: Option<Duration>,
	wipe_policy: Option<WipePolicy>,
	redirect_to: Option<String>,
}
impl ClientConfigBuilder {
	/// Sets the API base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the public uploads URL.
	pub fn uploads_url(mut self, url: Url) -> Self {
		self.uploads_url = Some(url);

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the store wipe policy used on terminal refresh failures.
	pub fn wipe_policy(mut self, policy: WipePolicy) -> Self {
		self.wipe_policy = Some(policy);

		self
	}

	/// Sets the sign-in location announced when the session expires.
	pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
		self.redirect_to = Some(location.into());

		self
	}

	/// Applies `PORTFOLIO_*` environment overrides on top of the current builder values.
	pub fn with_env(mut self) -> Result<Self, ConfigError> {
		if let Some(raw) = read_env(ENV_BASE_URL) {
			self.base_url = Some(parse_url("base", &raw)?);
		}
		if let Some(raw) = read_env(ENV_UPLOADS_URL) {
			self.uploads_url = Some(parse_url("uploads", &raw)?);
		}
		if let Some(raw) = read_env(ENV_TIMEOUT_MS) {
			let millis = raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnv {
				name: ENV_TIMEOUT_MS,
				reason: e.to_string(),
			})?;

			self.timeout = Some(Duration::milliseconds(millis));
		}

		Ok(self)
	}

	/// Validates the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let defaults = ClientConfig::default();
		let base_url = match self.base_url {
			Some(url) => {
				validate_url("base", &url)?;

				normalize_base(url)
			},
			None => defaults.base_url,
		};
		let uploads_url = match self.uploads_url {
			Some(url) => {
				validate_url("uploads", &url)?;

				url
			},
			None => defaults.uploads_url,
		};
		let timeout = self.timeout.unwrap_or(defaults.timeout);

		if !timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(ClientConfig {
			base_url,
			uploads_url,
			timeout,
			wipe_policy: self.wipe_policy.unwrap_or(defaults.wipe_policy),
			redirect_to: self.redirect_to.unwrap_or(defaults.redirect_to),
		})
	}
}

fn read_env(name: &str) -> Option<String> {
	env::var(name).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn parse_default(raw: &str) -> Url {
	Url::parse(raw).unwrap_or_else(|e| unreachable!("Built-in URL `{raw}` must parse: {e}"))
}

fn validate_url(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { field, scheme: url.scheme().to_owned() });
	}
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { field });
	}

	Ok(())
}

fn normalize_base(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}
