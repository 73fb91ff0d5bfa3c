use std::error::Error as StdError;

/// Crate-wide result type for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed provider errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider session is not connected or not ready.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// The provider rejected the recipient or the payload.
    #[error("provider rejected message: {message}")]
    Rejected { message: String },

    /// Wrapped source error from the underlying session.
    #[error("provider operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn rejected(message: impl std::fmt::Display) -> Self {
        Self::Rejected {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
