//! Hero copy blocks managed from the admin dashboard; one row per profile is active.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiHttpClient, Method},
	resources::Collection,
};

/// `/site-content/` endpoints.
pub struct SiteContent<'a, C>(Collection<'a, C>)
where
	C: ?Sized + ApiHttpClient;
impl<'a, C> SiteContent<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
		Self(Collection::new(client, "site-content/", "items"))
	}

	/// Fetches the active content shown on public pages, optionally for one profile.
	///
	/// The backend answers `null` when nothing is active.
	pub async fn public<T>(&self, slug: Option<&str>) -> Result<Option<T>>
	where
		T: DeserializeOwned,
	{
		let client = self.0.client();
		let request = client
			.request(Method::Get, "site-content/public")?
			.with_query(slug.map(|slug| ("slug", slug)));

		client.send_json(request).await
	}

	/// Fetches the admin listing payload as returned by the backend.
	pub async fn list<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let client = self.0.client();

		client.send_json(client.request(Method::Get, self.0.base())?).await
	}

	/// Fetches one content row.
	pub async fn get<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.0.get(id).await
	}

	/// Creates a content row.
	pub async fn create<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.0.create(body).await
	}

	/// Replaces a content row.
	pub async fn update<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.0.update(id, body).await
	}

	/// Makes a row the active one for its profile and returns it.
	pub async fn activate<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let client = self.0.client();
		let path = format!("{}{id}/activate", self.0.base());

		client.send_json(client.request(Method::Post, &path)?).await
	}

	/// Deletes a content row.
	pub async fn remove(&self, id: impl Display) -> Result<()> {
		self.0.delete(id).await
	}
}
