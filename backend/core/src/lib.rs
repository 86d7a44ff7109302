pub mod error;
pub mod types;

pub use error::{StatusError, VerifyError};
pub use types::{KeySet, PeerStatus, StatusDocument, VerifyRequest, VerifyResponse};
