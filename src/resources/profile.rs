//! Owner profile endpoints.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiHttpClient, Method},
};

/// `/profile/` endpoints.
pub struct Profile<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	client: &'a ApiClient<C>,
}
impl<'a, C> Profile<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
		Self { client }
	}

	/// Fetches the signed-in owner's profile.
	pub async fn me<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.client.send_json(self.client.request(Method::Get, "profile/me")?).await
	}

	/// Updates the signed-in owner's profile.
	pub async fn update_me<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let request = self.client.request(Method::Put, "profile/me")?.with_json(body)?;

		self.client.send_json(request).await
	}

	/// Fetches the public profile of `user_id`.
	pub async fn public<T>(&self, user_id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = self.client.request(Method::Get, &format!("profile/{user_id}"))?;

		self.client.send_json(request).await
	}
}
