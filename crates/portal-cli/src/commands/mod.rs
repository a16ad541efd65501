//! Subcommand implementations.

pub mod apps;
pub mod login;
pub mod logout;
pub mod notifications;
pub mod request;
pub mod status;
