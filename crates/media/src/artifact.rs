use serde::{Deserialize, Serialize};

/// Canonical resolved media: a MIME type, a base64 payload, and a filename.
///
/// Wire field is `data` (not `payload`) to stay compatible with clients of
/// the original gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub mimetype: String,
    #[serde(rename = "data")]
    pub payload: String,
    pub filename: String,
}

/// Caller-supplied media specification. Exactly one shape is expected:
/// inline (`data` + `mimetype`), a local file `path`, or a remote `url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaDescriptor {
    #[serde(rename = "data")]
    pub payload: Option<String>,
    pub mimetype: Option<String>,
    pub filename: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
}
