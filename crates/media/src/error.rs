use std::error::Error as StdError;

/// Crate-wide result type for media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed media resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The descriptor matches none of the recognized shapes.
    #[error("invalid media descriptor: {message}")]
    InvalidDescriptor { message: String },

    /// Reading a file or fetching a URL failed.
    #[error("media fetch failed: {context}: {source}")]
    Fetch {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A remote fetch returned a non-success status.
    #[error("media fetch failed: {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },
}

impl Error {
    #[must_use]
    pub fn invalid_descriptor(message: impl std::fmt::Display) -> Self {
        Self::InvalidDescriptor {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn fetch(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Fetch {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for descriptor-shape errors the caller should treat as bad input
    /// rather than a downstream failure.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidDescriptor { .. })
    }
}
