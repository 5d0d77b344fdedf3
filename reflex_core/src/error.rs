//! Error types for the Reflex runtime

use thiserror::Error;

/// Result alias used throughout Reflex
pub type ReflexResult<T> = std::result::Result<T, ReflexError>;

/// Errors produced by the Reflex runtime and nodes
#[derive(Debug, Error)]
pub enum ReflexError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topic creation or message delivery failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Filesystem error (parameter files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parameter (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Node lifecycle failure
    #[error("Node error in '{node}': {message}")]
    Node { node: String, message: String },

    /// Caller passed an unusable value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReflexError {
    /// Shorthand for a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ReflexError::Config(msg.into())
    }

    /// Shorthand for a node error
    pub fn node<N: Into<String>, M: Into<String>>(node: N, message: M) -> Self {
        ReflexError::Node {
            node: node.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ReflexError {
    fn from(err: serde_json::Error) -> Self {
        ReflexError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ReflexError {
    fn from(err: serde_yaml::Error) -> Self {
        ReflexError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ReflexError {
    fn from(err: toml::de::Error) -> Self {
        ReflexError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ReflexError {
    fn from(err: toml::ser::Error) -> Self {
        ReflexError::Serialization(err.to_string())
    }
}
