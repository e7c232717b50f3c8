//! Portfolio entries: projects, skills, experience, education, and 3D scene configuration.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiHttpClient, Method},
	resources::Collection,
};

macro_rules! collection_resource {
	($(#[$meta:meta])* $name:ident, $base:literal, $envelope:literal) => {
		$(#[$meta])*
		pub struct $name<'a, C>(Collection<'a, C>)
		where
			C: ?Sized + ApiHttpClient;
		impl<'a, C> $name<'a, C>
		where
			C: ?Sized + ApiHttpClient,
		{
			pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
				Self(Collection::new(client, $base, $envelope))
			}
		}
		impl<'a, C> Deref for $name<'a, C>
		where
			C: ?Sized + ApiHttpClient,
		{
			type Target = Collection<'a, C>;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
	};
}

collection_resource!(
	/// `/projects/` endpoints.
	Projects,
	"projects/",
	"projects"
);
collection_resource!(
	/// `/skills/` endpoints.
	Skills,
	"skills/",
	"skills"
);
collection_resource!(
	/// `/experience/` endpoints.
	Experience,
	"experience/",
	"experiences"
);
collection_resource!(
	/// `/education/` endpoints.
	Education,
	"education/",
	"educations"
);
collection_resource!(
	/// `/three-config/` endpoints describing 3D scenes.
	SceneConfigs,
	"three-config/",
	"configs"
);

impl<C> Projects<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists projects flagged as featured.
	pub async fn featured<T>(&self) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.list_with([("featured", "true")]).await
	}

	/// Lists projects in `category`.
	pub async fn by_category<T>(&self, category: &str) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.list_with([("category", category)]).await
	}
}

impl<C> Skills<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists skills in `category`.
	pub async fn by_category<T>(&self, category: &str) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.list_with([("category", category)]).await
	}
}

impl<C> Experience<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists experience entries, scoped to a public profile when `slug` is set.
	pub async fn for_profile<T>(&self, slug: Option<&str>) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		self.list_with(slug.map(|slug| ("slug", slug))).await
	}
}

impl<C> SceneConfigs<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the configuration for the named scene.
	pub async fn by_scene<T>(&self, scene: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let client = self.client();
		let request = client.request(Method::Get, &format!("{}by-scene/{scene}", self.base()))?;

		client.send_json(request).await
	}
}
