use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the bundle progress store.
///
/// Read and parse failures of the state file never show up here: they are recovered inside
/// [`super::ProgressStore::load`] by starting from an empty state.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The bundle name does not resolve through the bundle index.
    #[error("bundle not found: {0}")]
    BundleNotFound(String),

    /// The bundle exists but does not list this item.
    #[error("'{item}' is not part of {bundle}")]
    ItemNotFound { item: String, bundle: String },

    /// Writing the state file failed; the mutation was not persisted.
    #[error("failed to persist bundle progress to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the state document failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProgressError {
    /// True for the lookup failures that are reported back to the user as a plain message.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProgressError::BundleNotFound(_) | ProgressError::ItemNotFound { .. }
        )
    }
}
