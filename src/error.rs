use thiserror::Error;

/// Unified error type for deploy-tagger operations
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Malformed tag: {0}")]
    MalformedTag(String),

    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Unsupported bump type: {0}")]
    UnsupportedBump(String),

    #[error("Unsupported tag dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Tag has no release counter: {0}")]
    Unreleased(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in deploy-tagger
pub type Result<T> = std::result::Result<T, TagError>;

impl TagError {
    /// Create a malformed tag error with context
    pub fn malformed_tag(msg: impl Into<String>) -> Self {
        TagError::MalformedTag(msg.into())
    }

    /// Create a malformed version error with context
    pub fn malformed_version(msg: impl Into<String>) -> Self {
        TagError::MalformedVersion(msg.into())
    }

    /// Create an unsupported bump error with context
    pub fn unsupported_bump(msg: impl Into<String>) -> Self {
        TagError::UnsupportedBump(msg.into())
    }

    /// Create an unsupported dialect error with context
    pub fn unsupported_dialect(msg: impl Into<String>) -> Self {
        TagError::UnsupportedDialect(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TagError::Config(msg.into())
    }

    /// True for failures caused by the input text rather than the environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            TagError::MalformedTag(_)
                | TagError::MalformedVersion(_)
                | TagError::UnknownEnvironment(_)
        )
    }
}
