use std::path::Path;

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    tracing::debug,
};

use crate::{
    artifact::{MediaArtifact, MediaDescriptor},
    error::{Error, Result},
};

/// Used when no MIME type can be derived from headers or extension.
pub const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// Used when no filename can be derived from the source.
pub const DEFAULT_FILENAME: &str = "file";

/// Resolve a descriptor into a canonical artifact.
///
/// Shapes are checked in precedence order — inline payload, then local
/// file, then remote URL — and the first match wins. Every call re-reads
/// or re-fetches; nothing is cached. The whole payload is buffered in
/// memory, so very large media is on the caller.
pub async fn resolve(descriptor: &MediaDescriptor) -> Result<MediaArtifact> {
    if let (Some(payload), Some(mimetype)) = (&descriptor.payload, &descriptor.mimetype) {
        return Ok(MediaArtifact {
            mimetype: mimetype.clone(),
            payload: payload.clone(),
            filename: descriptor
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        });
    }

    if let Some(path) = &descriptor.path {
        return from_file(path).await;
    }

    if let Some(url) = &descriptor.url {
        return from_url(url).await;
    }

    Err(Error::invalid_descriptor(
        "expected inline data + mimetype, a file path, or a url",
    ))
}

/// Read a local file fully into memory and encode it.
async fn from_file(path: &str) -> Result<MediaArtifact> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::fetch(format!("read {path}"), e))?;

    let mimetype = extension_mimetype(path)
        .unwrap_or(DEFAULT_MIMETYPE)
        .to_string();
    let filename = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string();

    debug!(path, %mimetype, bytes = bytes.len(), "resolved media from file");

    Ok(MediaArtifact {
        mimetype,
        payload: STANDARD.encode(&bytes),
        filename,
    })
}

/// Fetch a remote URL fully into memory and encode it.
///
/// No timeout is applied here; a hung server stalls only the requesting
/// task.
async fn from_url(url: &str) -> Result<MediaArtifact> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::fetch(format!("fetch {url}"), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Derive filename and the extension fallback from the final URL before
    // the response body is consumed.
    let filename = filename_from_url(response.url());
    let url_path = response.url().path().to_string();

    let mimetype = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| extension_mimetype(&url_path).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::fetch(format!("read body of {url}"), e))?;

    debug!(url, %mimetype, bytes = bytes.len(), "resolved media from url");

    Ok(MediaArtifact {
        mimetype,
        payload: STANDARD.encode(&bytes),
        filename,
    })
}

/// MIME type from a path's extension, if recognized.
fn extension_mimetype(path: &str) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Final path segment of a URL, or the default filename.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}
