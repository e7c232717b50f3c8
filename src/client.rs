//! The authenticated request client.
//!
//! [`ApiClient`] decorates every request with the session's bearer token, detects expired
//! credentials (HTTP 401 on a request that has not been replayed yet), and routes recovery
//! through the session's single-flight refresh coordinator before replaying the request once.

mod auth;

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	config::ClientConfig,
	error::{ConfigError, RefreshFailure},
	http::{ApiHttpClient, ApiRequest, ApiResponse, Method},
	obs::{self, Operation, OperationSpan, Outcome},
	session::AuthSession,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const REFRESH_PATH: &str = "auth/refresh";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Authenticated client for the portfolio API.
///
/// Clones share the transport, configuration, and [`AuthSession`], so a refresh triggered
/// through one clone releases requests waiting on every other clone.
pub struct ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	config: Arc<ClientConfig>,
	session: Arc<AuthSession>,
	http_client: Arc<C>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let session = Arc::new(AuthSession::new(store, &config));

		Self { config: Arc::new(config), session, http_client: http_client.into() }
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Shared session state; subscribe here for [`SessionEvent`](crate::session::SessionEvent)s.
	pub fn session(&self) -> &Arc<AuthSession> {
		&self.session
	}

	/// Underlying transport.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Starts a request for `path`, resolved against the API base URL.
	pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest, ConfigError> {
		Ok(ApiRequest::new(method, self.config.endpoint(path)?))
	}

	/// Sends `request` with the current bearer token, recovering once from an expired token.
	///
	/// Non-success statuses surface as [`Error::Api`]; a terminal refresh failure surfaces as
	/// [`Error::SessionExpired`] after the stored credentials have been removed.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const OPERATION: Operation = Operation::Request;

		let span = OperationSpan::new(OPERATION, "send");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		obs::record_result(OPERATION, result)
	}

	/// Sends `request` and decodes the JSON response body.
	pub async fn send_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		Ok(self.send(request).await?.json_body()?)
	}

	/// Sends `request` without credentials and without expired-token handling.
	pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse> {
		let response = self.execute(&request.authorized(None)).await?;

		Ok(response.error_for_status()?)
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let snapshot = self.session.snapshot().await?;
		let response = self.execute(&request.authorized(snapshot.access_token.as_ref())).await?;

		if !response.is_unauthorized() || request.is_retry() {
			return Ok(response.error_for_status()?);
		}

		let token = self
			.session
			.recover(snapshot.generation, |refresh_token| self.call_refresh(refresh_token))
			.await?;
		let mut replay = request.authorized(Some(&token));

		replay.mark_retried();

		Ok(self.execute(&replay).await?.error_for_status()?)
	}

	async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
		self.http_client
			.execute(request)
			.await
			.map_err(|e| Error::Transport(self.http_client.map_error(e)))
	}

	// Goes straight to the transport so the refresh call itself is never intercepted.
	async fn call_refresh(&self, refresh_token: TokenSecret) -> Result<TokenPair, RefreshFailure> {
		const OPERATION: Operation = Operation::Refresh;

		let span = OperationSpan::new(OPERATION, "call_refresh");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self
					.request(Method::Post, REFRESH_PATH)
					.and_then(|request| {
						request.with_json(&RefreshBody { refresh_token: refresh_token.expose() })
					})
					.map_err(|e| RefreshFailure::Transport { message: e.to_string() })?;
				let response = self
					.http_client
					.execute(&request)
					.await
					.map_err(|e| RefreshFailure::Transport {
						message: self.http_client.map_error(e).to_string(),
					})?;

				if !response.is_success() {
					return Err(RefreshFailure::Rejected {
						status: response.status(),
						detail: response.to_api_error().detail,
					});
				}

				response.json_body::<TokenPair>().map_err(|e| RefreshFailure::MalformedResponse {
					message: e.source.to_string(),
				})
			})
			.await;

		obs::record_result(OPERATION, result)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client with a reqwest transport honoring the configured timeout.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, store, http_client))
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			session: self.session.clone(),
			http_client: self.http_client.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("session", &self.session)
			.finish()
	}
}

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use serde_json::json;
	// self
	use super::*;
	use crate::{_preludet::*, auth::Credentials, error::Error, http::Method};

	#[tokio::test]
	async fn established_session_sends_bearer_token() {
		let server = MockServer::start_async().await;
		let (client, store) = build_reqwest_test_client(&server.url("/api/v1"));

		client
			.session()
			.establish(Credentials::new("access-1", "refresh-1"))
			.await
			.expect("Establishing credentials should succeed.");

		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/api/v1/skills/")
					.header("authorization", "Bearer access-1");
				then.status(200).json_body(json!([]));
			})
			.await;
		let request =
			client.request(Method::Get, "/skills/").expect("Skills path should resolve.");
		let response = client.send(request).await.expect("Authorized request should succeed.");

		mock.assert_async().await;
		assert!(response.is_success());
		assert!(!store.is_empty());
	}

	#[tokio::test]
	async fn server_errors_surface_without_refresh() {
		let server = MockServer::start_async().await;
		let (client, _) = build_reqwest_test_client(&server.url("/api/v1"));
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/api/v1/education/");
				then.status(503)
					.header("retry-after", "30")
					.json_body(json!({ "detail": "Maintenance" }));
			})
			.await;
		let request =
			client.request(Method::Get, "education/").expect("Education path should resolve.");
		let err = client.send(request).await.expect_err("503 should surface as an API error.");

		mock.assert_async().await;

		match err {
			Error::Api(api) => {
				assert_eq!(api.status, 503);
				assert_eq!(api.detail.as_deref(), Some("Maintenance"));
				assert_eq!(api.retry_after, Some(time::Duration::seconds(30)));
			},
			other => panic!("Unexpected error: {other:?}"),
		}

		assert_eq!(client.session().metrics().attempts(), 0);
	}
}
