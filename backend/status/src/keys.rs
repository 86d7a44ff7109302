//! Key-Set Extractor

use peerverify_core::{KeySet, StatusDocument, StatusError};

use crate::fetcher::StatusSource;

/// Collect the local node's key and every peer key present in `doc`.
///
/// `null` records and records without a `PublicKey` are skipped, so this
/// never fails.
pub fn extract_keys(doc: &StatusDocument) -> KeySet {
    let self_key = doc.self_node.iter().filter_map(|node| node.public_key.as_deref());
    let peer_keys = doc
        .peer
        .iter()
        .flat_map(|peers| peers.values())
        .flatten()
        .filter_map(|peer| peer.public_key.as_deref());

    self_key.chain(peer_keys).collect()
}

/// Fetch fresh status from `source` and reduce it to its key set.
pub async fn known_keys(source: &dyn StatusSource) -> Result<KeySet, StatusError> {
    let doc = source.fetch_status().await?;
    Ok(extract_keys(&doc))
}
