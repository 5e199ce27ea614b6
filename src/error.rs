//! Error taxonomy shared by the store, the selection service and the HTTP
//! layer. Callers branch on the variant: validation problems and unknown ids
//! are user-facing, everything else is an unexpected failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongbookError {
    /// A required field is missing or blank.
    #[error("{0}")]
    Validation(String),

    /// No row with the requested id.
    #[error("{0}")]
    NotFound(String),

    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to (de)serialize alternate titles")]
    Serialization(#[from] serde_json::Error),

    /// The store could not be reached (poisoned lock, cancelled task).
    #[error("{0}")]
    Unavailable(String),
}

impl SongbookError {
    pub fn validation(message: impl Into<String>) -> Self {
        SongbookError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SongbookError::NotFound(message.into())
    }

    /// True for the failures a user can fix by changing their input.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SongbookError::Validation(_) | SongbookError::NotFound(_)
        )
    }
}

pub type Result<T, E = SongbookError> = std::result::Result<T, E>;

/// Attach a short description to a rusqlite failure, in the spirit of
/// `anyhow::Context` but keeping the typed error.
pub(crate) trait StorageContext<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> StorageContext<T> for rusqlite::Result<T> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| SongbookError::Storage { context, source })
    }
}
