//! Service banner and health probes served at the API origin.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	error::ConfigError,
	http::{ApiHttpClient, ApiRequest, Method},
};

/// Root and health endpoints outside the versioned API prefix.
pub struct System<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	client: &'a ApiClient<C>,
}
impl<'a, C> System<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
		Self { client }
	}

	/// Fetches the service banner at `/`.
	pub async fn root<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.probe("").await
	}

	/// Fetches the health report at `/health`.
	pub async fn health<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.probe("health").await
	}

	async fn probe<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = self
			.client
			.config()
			.api_origin()
			.join(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;
		let response = self.client.send_anonymous(ApiRequest::new(Method::Get, url)).await?;

		Ok(response.json_body()?)
	}
}
