//! Error types returned by [`Repo`](crate::Repo) implementations.

use thiserror::Error;

/// Errors raised while answering a repository query.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A constituent repository of a composite repository failed.
    #[error("repo {name}: {source}")]
    Repo {
        /// Name of the failing repository
        name: String,
        /// The underlying error
        #[source]
        source: Box<RepoError>,
    },

    /// Generic errors from dependencies
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for Results using [`RepoError`].
pub type RepoResult<T> = std::result::Result<T, RepoError>;

impl RepoError {
    /// Wraps an error with the name of the repository that produced it.
    #[must_use]
    pub fn in_repo(self, name: impl Into<String>) -> Self {
        Self::Repo {
            name: name.into(),
            source: Box::new(self),
        }
    }
}
