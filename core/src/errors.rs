//! Error types for NetLens core operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for NetLens core operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Network store error: {0}")]
    Load(#[from] LoadError),

    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors reported by the query layer.
///
/// Every variant maps to a stable [`ErrorKind`] so that clients can branch
/// on the kind without parsing the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("No network loaded")]
    NoModelLoaded,

    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("No static data available for component '{0}'")]
    NoStaticData(String),

    #[error("No varying data available for component '{0}'")]
    NoVaryingData(String),

    #[error("Attribute '{attribute}' not found in varying data of component '{component}'")]
    AttributeNotFound { component: String, attribute: String },

    #[error("Attribute '{attribute}' of component '{component}' has no valid data")]
    AttributeHasNoData { component: String, attribute: String },

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl QueryError {
    /// Machine-readable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::NoModelLoaded => ErrorKind::NoModelLoaded,
            QueryError::UnknownComponentType(_) => ErrorKind::UnknownComponentType,
            QueryError::NoStaticData(_) => ErrorKind::NoStaticData,
            QueryError::NoVaryingData(_) => ErrorKind::NoVaryingData,
            QueryError::AttributeNotFound { .. } => ErrorKind::AttributeNotFound,
            QueryError::AttributeHasNoData { .. } => ErrorKind::AttributeHasNoData,
            QueryError::QueryFailed(_) => ErrorKind::QueryFailed,
        }
    }
}

/// Stable identifiers for every failure a client can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NoModelLoaded,
    UnknownComponentType,
    NoStaticData,
    NoVaryingData,
    AttributeNotFound,
    AttributeHasNoData,
    QueryFailed,
    NetworkNotFound,
    InvalidNetworkName,
    LoadFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NoModelLoaded => "NoModelLoaded",
            ErrorKind::UnknownComponentType => "UnknownComponentType",
            ErrorKind::NoStaticData => "NoStaticData",
            ErrorKind::NoVaryingData => "NoVaryingData",
            ErrorKind::AttributeNotFound => "AttributeNotFound",
            ErrorKind::AttributeHasNoData => "AttributeHasNoData",
            ErrorKind::QueryFailed => "QueryFailed",
            ErrorKind::NetworkNotFound => "NetworkNotFound",
            ErrorKind::InvalidNetworkName => "InvalidNetworkName",
            ErrorKind::LoadFailed => "LoadFailed",
        };
        f.write_str(name)
    }
}

/// Structural faults inside a loaded model.
///
/// These never leave the query layer as-is; the accessors downgrade them to
/// [`QueryError::QueryFailed`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{context}: {found} rows do not align with {expected} snapshots")]
    Misaligned {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("{context}: time index differs from the network snapshots at position {position}")]
    IndexMismatch { context: String, position: usize },

    #[error("column '{column}' holds {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::QueryFailed(err.to_string())
    }
}

/// Errors related to listing and loading saved networks
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Network not found: {0}")]
    NotFound(String),

    #[error("Invalid network name: {0}")]
    InvalidName(String),

    #[error("I/O error while reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse network {name}: {message}")]
    Parse { name: String, message: String },

    #[error("Invalid network {name}: {message}")]
    Invalid { name: String, message: String },
}

impl LoadError {
    /// Machine-readable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::NotFound(_) => ErrorKind::NetworkNotFound,
            LoadError::InvalidName(_) => ErrorKind::InvalidNetworkName,
            LoadError::Io { .. } | LoadError::Parse { .. } | LoadError::Invalid { .. } => {
                ErrorKind::LoadFailed
            }
        }
    }

    /// Shorthand for an invalid-model error
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Invalid {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors related to presentation adapters
#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("Server startup failed: {0}")]
    StartupFailed(String),

    #[error("Server shutdown failed: {0}")]
    ShutdownFailed(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type alias for store operations
pub type LoadResult<T> = Result<T, LoadError>;
