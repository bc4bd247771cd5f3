//! Error types for inference and input adapters

use thiserror::Error;

/// Fatal inference failures. Anything else is resolved locally by
/// generalizing the inferred type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// No documents to infer from
    #[error("No documents provided for inference")]
    EmptyCorpus,

    /// Top-level documents disagree on their shape
    #[error("Corpus mixes top-level {first} and {second} documents; normalize the root shape first")]
    HeterogeneousRoot {
        first: &'static str,
        second: &'static str,
    },
}

/// Per-document failures raised while turning raw input into values.
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    /// JSON syntax or structure error, with the JSON path of the failure
    #[error("{source_name}: JSON error at {path}: {message}")]
    Json {
        source_name: String,
        path: String,
        message: String,
    },

    /// Malformed XML
    #[error("{source_name}: XML error at byte {position}: {message}")]
    Xml {
        source_name: String,
        position: u64,
        message: String,
    },

    /// JSON Pointer selected nothing
    #[error("{source_name}: JSON pointer {pointer} matched nothing")]
    Pointer { source_name: String, pointer: String },

    /// jq filter failed to compile or run
    #[error("{source_name}: jq filter failed: {message}")]
    Jq { source_name: String, message: String },

    /// IO error
    #[error("{source_name}: IO error: {message}")]
    Io { source_name: String, message: String },
}

impl AdapterError {
    pub fn source_name(&self) -> &str {
        match self {
            AdapterError::Json { source_name, .. }
            | AdapterError::Xml { source_name, .. }
            | AdapterError::Pointer { source_name, .. }
            | AdapterError::Jq { source_name, .. }
            | AdapterError::Io { source_name, .. } => source_name,
        }
    }
}
