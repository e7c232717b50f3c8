//! Typed helpers for the CMS resources.
//!
//! Request and response bodies are caller-chosen serde types; the backend owns the schemas.
//! Every helper sends through [`ApiClient::send`], so expired tokens are recovered the same
//! way as for hand-built requests.

pub mod collection;
pub mod contact;
pub mod profile;
pub mod site_content;
pub mod system;
pub mod upload;

mod catalog;

pub use catalog::*;
pub use collection::Collection;
pub use contact::Contact;
pub use profile::Profile;
pub use site_content::SiteContent;
pub use system::System;
pub use upload::{UploadFile, Uploads, relative_upload_path};

// self
use crate::{client::ApiClient, http::ApiHttpClient};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Project endpoints.
	pub fn projects(&self) -> Projects<'_, C> {
		Projects::new(self)
	}

	/// Skill endpoints.
	pub fn skills(&self) -> Skills<'_, C> {
		Skills::new(self)
	}

	/// Work experience endpoints.
	pub fn experience(&self) -> Experience<'_, C> {
		Experience::new(self)
	}

	/// Education endpoints.
	pub fn education(&self) -> Education<'_, C> {
		Education::new(self)
	}

	/// 3D scene configuration endpoints.
	pub fn scene_configs(&self) -> SceneConfigs<'_, C> {
		SceneConfigs::new(self)
	}

	/// Contact form and inbox endpoints.
	pub fn contact(&self) -> Contact<'_, C> {
		Contact::new(self)
	}

	/// Site copy endpoints.
	pub fn site_content(&self) -> SiteContent<'_, C> {
		SiteContent::new(self)
	}

	/// Owner profile endpoints.
	pub fn profile(&self) -> Profile<'_, C> {
		Profile::new(self)
	}

	/// Upload endpoints.
	pub fn uploads(&self) -> Uploads<'_, C> {
		Uploads::new(self)
	}

	/// Root and health endpoints.
	pub fn system(&self) -> System<'_, C> {
		System::new(self)
	}
}
