//! Identity returned by `/auth/me` and `/auth/test-token`.

// self
use crate::_prelude::*;

/// Authenticated account as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
	/// Account identifier.
	pub id: i64,
	/// Login email.
	pub email: String,
	/// Display name.
	#[serde(default)]
	pub full_name: Option<String>,
	/// Whether the account may sign in.
	#[serde(default = "default_true")]
	pub is_active: bool,
	/// Whether the account may use the admin dashboard.
	#[serde(default)]
	pub is_superuser: bool,
}
impl CurrentUser {
	/// Returns `true` for accounts allowed into the admin dashboard.
	pub fn is_admin(&self) -> bool {
		self.is_active && self.is_superuser
	}
}

fn default_true() -> bool {
	true
}
