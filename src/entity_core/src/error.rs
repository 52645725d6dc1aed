use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    /// The underlying store rejected or failed an operation.
    #[error("{operation} failed: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },

    #[error("invalid key: {0}")]
    Key(String),

    #[error("invalid pagination cursor")]
    InvalidCursor,

    #[error("item serialization failed: {0}")]
    Serialization(String),

    #[error("ksuid generator overflow")]
    KsuidOverflow,
}

impl Error {
    pub fn persistence(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            message: message.into(),
        }
    }

    pub fn key(msg: impl Into<String>) -> Self {
        Self::Key(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_dynamo::Error> for Error {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
