use futures::future::join_all;

use super::NodeId;
use crate::store::{BlobMeta, BlobStore};

/// A media slot waiting for its blob key to be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTask {
    pub generation: u64,
    pub node: NodeId,
    pub key: String,
}

/// Outcome of one lookup, addressed to the node that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub generation: u64,
    pub node: NodeId,
    pub key: String,
    pub meta: Option<BlobMeta>,
}

/// Look up every task concurrently. Results come back in task order, but
/// each one carries its own target so the order they are applied in does
/// not matter. A failed lookup resolves as missing.
pub async fn resolve_all(blobs: &dyn BlobStore, tasks: Vec<MediaTask>) -> Vec<Resolution> {
    let lookups = tasks.into_iter().map(|task| async move {
        let meta = match blobs.stat(&task.key).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(key = %task.key, "Media lookup failed: {}", e);
                None
            }
        };
        Resolution {
            generation: task.generation,
            node: task.node,
            key: task.key,
            meta,
        }
    });
    join_all(lookups).await
}
