//! Capability traits at the seams between the session manager and its
//! collaborators.

mod gateway;
mod store;

pub use gateway::{SignedOutGateway, TokenGateway};
pub use store::{AUTH_TOKEN_KEY, TokenStore};
