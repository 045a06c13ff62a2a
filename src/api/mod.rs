//! Session lifecycle and protocol dispatch for the grocery service.

pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod operations;
pub mod reauth;
pub mod session;
pub mod types;

pub use credentials::{CredentialChain, CredentialSource, Credentials, SecureString};
pub use dispatch::{ProtocolDispatcher, SearchKind, ANONYMOUS_CUSTOMER_ID};
pub use error::ApiError;
pub use reauth::{ApiClient, AuthedContext};
pub use session::SessionManager;
pub use types::{ApiFailure, Product, SearchResults, Session};
