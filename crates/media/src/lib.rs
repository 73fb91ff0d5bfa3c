//! Media resolution: turn a caller-supplied descriptor (inline payload,
//! local file, or remote URL) into a canonical base64 artifact.

pub mod artifact;
pub mod error;
pub mod resolve;

pub use {
    artifact::{MediaArtifact, MediaDescriptor},
    error::{Error, Result},
    resolve::{DEFAULT_FILENAME, DEFAULT_MIMETYPE, resolve},
};
