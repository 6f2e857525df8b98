//! Error types for the memory store.
//!
//! Write paths are strict and surface every failure through [`MemoryError`];
//! read paths treat a missing object or variable as absent rather than as an
//! error.

/// Result type for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors that can occur while mutating, reading, or persisting a memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A message role outside the accepted set.
    #[error("Invalid role '{0}'. Must be one of: {1}")]
    InvalidRole(String, String),

    /// A message mode outside the accepted set.
    #[error("Invalid mode '{0}'. Must be one of: {1}")]
    InvalidMode(String, String),

    /// A message channel outside the accepted set.
    #[error("Invalid channel '{0}'. Must be one of: {1}")]
    InvalidChannel(String, String),

    /// An event category name outside the accepted set.
    #[error("Invalid category '{0}'. Must be one of: {1}")]
    InvalidCategory(String, String),

    /// Deleting a variable that was never set.
    #[error("Variable '{0}' does not exist")]
    VariableNotFound(String),

    /// An event with the same stamp is already recorded.
    #[error("Duplicate event stamp: {0}")]
    DuplicateStamp(String),

    /// A filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack encoding of an object payload failed.
    #[error("MessagePack encode error: {0}")]
    Encoding(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding of an object payload failed.
    #[error("MessagePack decode error: {0}")]
    Decoding(#[from] rmp_serde::decode::Error),

    /// An object record carried data that is not valid base64.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Compressing or decompressing an object payload failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// A decompressed object does not match its declared content type.
    #[error("Corrupt object: {0}")]
    CorruptObject(String),

    /// A payload cannot be stored under the requested content type.
    #[error("Content type '{content_type}' cannot hold a {payload} payload")]
    ContentMismatch {
        /// Requested content type
        content_type: String,
        /// Kind of payload that was supplied
        payload: String,
    },

    /// A persisted document declares a format version this build cannot read.
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),

    /// A persisted document is internally inconsistent.
    #[error("Snapshot corrupted: {0}")]
    SnapshotCorrupted(String),
}
