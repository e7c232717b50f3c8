//! Contact form submissions and the admin inbox.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::ApiHttpClient,
	resources::Collection,
};

/// `/contact/` endpoints.
pub struct Contact<'a, C>(Collection<'a, C>)
where
	C: ?Sized + ApiHttpClient;
impl<'a, C> Contact<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
		Self(Collection::new(client, "contact/", "messages"))
	}

	/// Submits a visitor message.
	pub async fn submit<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.0.create(body).await
	}

	/// Lists received messages.
	pub async fn list<T>(&self) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.0.list().await
	}

	/// Marks a message as read.
	pub async fn mark_read<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.0.update(id, &MarkRead { is_read: true }).await
	}

	/// Deletes a message.
	pub async fn delete(&self, id: impl Display) -> Result<()> {
		self.0.delete(id).await
	}
}

#[derive(Serialize)]
struct MarkRead {
	is_read: bool,
}
