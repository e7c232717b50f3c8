//! Session lifecycle notifications.

// self
use crate::{_prelude::*, error::RefreshFailure};

/// Callback registered through [`AuthSession::subscribe`](crate::session::AuthSession::subscribe).
pub type SessionObserver = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Lifecycle change announced to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// A login stored a new credential pair.
	LoggedIn,
	/// A refresh stored a new access token.
	Refreshed,
	/// The owner logged out.
	LoggedOut,
	/// The session could not be recovered; stored credentials were removed and the user
	/// should sign in again at `redirect_to`.
	Expired {
		/// Why the refresh failed.
		reason: RefreshFailure,
		/// Configured sign-in location.
		redirect_to: String,
	},
}
impl SessionEvent {
	/// Returns `true` for [`SessionEvent::Expired`].
	pub fn is_expired(&self) -> bool {
		matches!(self, Self::Expired { .. })
	}
}
