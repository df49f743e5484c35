//! Authentication state.
//!
//! - `Session`: the logged-in identity (username, role, mode, token),
//!   persisted as `session.json` in the cache directory until logout
//! - `CredentialStore`: optional remembered password in the OS keychain

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
