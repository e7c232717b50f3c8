//! Transport primitives for API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside the replayable [`ApiRequest`] and buffered
//! [`ApiResponse`] so downstream crates can plug in custom HTTP stacks (or scripted fakes in
//! tests) without losing the client's refresh pipeline. Transports receive a request that
//! already carries its bearer credential and return the raw response; status interpretation
//! stays with [`ApiClient`](crate::client::ApiClient).

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::multipart::{Form as MultipartForm, Part as MultipartPart};
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, error::ConfigError};

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing API calls.
///
/// The trait acts as the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared by every clone of an
/// [`ApiClient`](crate::client::ApiClient), and the futures they return must be `Send` so
/// callers can spawn requests onto multi-threaded executors.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and buffers the whole response.
	///
	/// Any HTTP status, including 401, must be returned as `Ok`; `Err` is reserved for
	/// failures where no response arrived.
	fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, Self::TransportError>;

	/// Converts a transport failure into the client's [`TransportError`].
	fn map_error(&self, error: Self::TransportError) -> TransportError {
		TransportError::network(error)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a reqwest client honoring the configured timeout.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(config.timeout.unsigned_abs()).build()?;

		Ok(Self(client))
	}

	fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder, ReqwestError> {
		let method = match request.method() {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, request.url().clone());

		for (name, value) in request.headers() {
			builder = builder.header(name.as_str(), value.as_str());
		}

		let builder = match request.body() {
			RequestBody::Empty => builder,
			RequestBody::Bytes { data, .. } => builder.body(data.clone()),
			RequestBody::Multipart(parts) => {
				let mut form = MultipartForm::new();

				for part in parts {
					let file = MultipartPart::bytes(part.data.to_vec())
						.file_name(part.file_name.clone())
						.mime_str(&part.mime)?;

					form = form.part(part.field.clone(), file);
				}

				builder.multipart(form)
			},
		};

		Ok(builder)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let response = self.build(request)?.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse::new(status, headers, body))
		})
	}

	fn map_error(&self, error: Self::TransportError) -> TransportError {
		TransportError::from(error)
	}
}
