//! portal-file - Filesystem-backed token storage.
//!
//! Persists the current identity token in a small JSON key-value file so a
//! session survives process restarts.

mod store;

pub use store::FileTokenStore;
