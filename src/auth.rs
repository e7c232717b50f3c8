//! Auth-domain credential models, token payload inspection, and identity types.

pub mod claims;
pub mod token;
pub mod user;

pub use claims::*;
pub use token::{credentials::*, secret::*};
pub use user::*;
