//! CRUD helper shared by every list-shaped resource.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	error::DecodeError,
	http::{ApiHttpClient, ApiResponse, Method},
};

/// CRUD operations over one collection path such as `projects/`.
pub struct Collection<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	client: &'a ApiClient<C>,
	base: &'static str,
	envelope: &'static str,
}
impl<'a, C> Collection<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a helper for `base` (with trailing slash) whose list responses may wrap items
	/// in an object under `envelope`.
	pub fn new(client: &'a ApiClient<C>, base: &'static str, envelope: &'static str) -> Self {
		Self { client, base, envelope }
	}

	/// Collection path relative to the API base URL.
	pub fn base(&self) -> &'static str {
		self.base
	}

	/// Client the helper sends through.
	pub fn client(&self) -> &'a ApiClient<C> {
		self.client
	}

	/// Lists every item.
	pub async fn list<T>(&self) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.list_with(Vec::<(&str, &str)>::new()).await
	}

	/// Lists items matching the query parameters.
	pub async fn list_with<T, K, V>(
		&self,
		query: impl IntoIterator<Item = (K, V)>,
	) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let request = self.client.request(Method::Get, self.base)?.with_query(query);
		let response = self.client.send(request).await?;

		Ok(decode_listing(&response, self.envelope)?)
	}

	/// Fetches one item.
	pub async fn get<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.client.send_json(self.client.request(Method::Get, &self.item(id))?).await
	}

	/// Creates an item and returns the stored representation.
	pub async fn create<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let request = self.client.request(Method::Post, self.base)?.with_json(body)?;

		self.client.send_json(request).await
	}

	/// Replaces an item and returns the stored representation.
	pub async fn update<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let request = self.client.request(Method::Put, &self.item(id))?.with_json(body)?;

		self.client.send_json(request).await
	}

	/// Deletes an item.
	pub async fn delete(&self, id: impl Display) -> Result<()> {
		self.client.send(self.client.request(Method::Delete, &self.item(id))?).await?;

		Ok(())
	}

	fn item(&self, id: impl Display) -> String {
		format!("{}{id}", self.base)
	}
}

/// Decodes a list response that is either a bare array or an object holding the array under
/// `envelope`; `null` and envelopes without the key yield an empty list.
pub fn decode_listing<T>(response: &ApiResponse, envelope: &str) -> Result<Vec<T>, DecodeError>
where
	T: DeserializeOwned,
{
	let items = match response.json_body::<serde_json::Value>()? {
		serde_json::Value::Null => return Ok(Vec::new()),
		serde_json::Value::Object(mut object) => match object.remove(envelope) {
			Some(serde_json::Value::Null) | None => return Ok(Vec::new()),
			Some(items) => items,
		},
		other => other,
	};

	serde_path_to_error::deserialize(items)
		.map_err(|source| DecodeError { status: response.status(), source })
}
