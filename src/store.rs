//! Storage contracts and built-in store implementations for session credentials.
//!
//! Stores are string key/value maps so the same backend can also hold unrelated client
//! state next to the credentials; [`WipePolicy`](crate::config::WipePolicy) decides whether
//! a terminal refresh failure removes only the token entries or everything.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credentials, auth::TokenSecret, config::WipePolicy};

/// Store key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Store key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Every key owned by the session.
pub const AUTH_KEYS: [&str; 2] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY];

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable key/value persistence for session credentials.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Writes every entry in one step, replacing existing values.
	fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()>;

	/// Removes the listed keys; missing keys are ignored.
	fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()>;

	/// Removes every entry.
	fn clear(&self) -> StoreFuture<'_, ()>;
}
impl<'s> dyn SessionStore + 's {
	/// Loads whichever tokens are stored.
	pub async fn load_credentials(&self) -> Result<Credentials, StoreError> {
		let access_token = self.get(ACCESS_TOKEN_KEY).await?.map(TokenSecret::new);
		let refresh_token = self.get(REFRESH_TOKEN_KEY).await?.map(TokenSecret::new);

		Ok(Credentials { access_token, refresh_token })
	}

	/// Persists `credentials`, removing entries for missing halves.
	pub async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
		let mut entries = Vec::with_capacity(2);
		let mut missing = Vec::with_capacity(2);

		for (key, secret) in [
			(ACCESS_TOKEN_KEY, credentials.access_token.as_ref()),
			(REFRESH_TOKEN_KEY, credentials.refresh_token.as_ref()),
		] {
			match secret {
				Some(secret) => entries.push((key.to_owned(), secret.expose().to_owned())),
				None => missing.push(key),
			}
		}

		self.set_many(entries).await?;

		if !missing.is_empty() {
			self.remove_many(&missing).await?;
		}

		Ok(())
	}

	/// Removes credentials according to `policy`.
	pub async fn wipe(&self, policy: WipePolicy) -> Result<(), StoreError> {
		match policy {
			WipePolicy::AuthKeys => self.remove_many(&AUTH_KEYS).await,
			WipePolicy::Everything => self.clear().await,
		}
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
