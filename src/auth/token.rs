//! Bearer credential wrappers and the token pair issued by the auth endpoints.

pub mod credentials;
pub mod secret;
