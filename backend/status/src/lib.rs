//! Queries the local mesh daemon for its peer status and derives the set of
//! node keys it currently knows about.

pub mod fetcher;
pub mod keys;

pub use fetcher::{CommandStatusSource, StatusSource, DEFAULT_STATUS_TIMEOUT};
pub use keys::{extract_keys, known_keys};
