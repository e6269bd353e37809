//! Custom error types for catalog operations.
//!
//! This module provides structured error handling using `thiserror`. Only fatal
//! conditions are errors here: malformed records never fail a refresh, they are
//! reported as warnings on the snapshot instead.

use plateau_catalog_common::RepoError;
use thiserror::Error;

/// Main error type for catalog operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Record fetch errors (source unavailable, unknown project)
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tenant registry errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Repository query errors
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Generic errors from dependencies
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while loading raw records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source does not know the project
    #[error("Unknown project '{project}'")]
    UnknownProject {
        /// The requested project
        project: String,
    },

    /// Loading one model failed
    #[error("Failed to fetch {model} items of project '{project}': {message}")]
    Model {
        /// The project being loaded
        project: String,
        /// The model key (e.g. `plateau-city`)
        model: String,
        /// Description of the failure
        message: String,
    },
}

/// Configuration errors.
///
/// These errors occur when options or configuration are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Required option is missing
    #[error("Missing required option: {option}")]
    MissingRequired {
        /// The missing option name
        option: String,
    },
}

/// Tenant registry errors.
#[derive(Debug, Error)]
pub enum TenantError {
    /// The tenant was never prepared
    #[error("Tenant '{project}' is not registered")]
    NotFound {
        /// The project name
        project: String,
    },

    /// The tenant is registered but has no snapshot yet
    #[error("Tenant '{project}' has no snapshot")]
    NotLoaded {
        /// The project name
        project: String,
    },
}

/// Type alias for Results using `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => format!("Fetch error: {e}"),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Tenant(e) => e.user_message(),
            Self::Repo(e) => format!("Query error: {e}"),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// A failed fetch may succeed on the next refresh; the previous snapshot
    /// stays authoritative meanwhile.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Model { .. }))
    }
}

impl TenantError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { project } => {
                format!("Project '{project}' is not registered. Prepare it before querying.")
            },
            Self::NotLoaded { .. } => self.to_string(),
        }
    }
}
