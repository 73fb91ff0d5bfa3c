use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::Mutex,
    tracing::{debug, info},
};

use crate::{
    Result,
    error::Error,
    log::MessageLog,
    record::MessageRecord,
};

/// On-disk document: the entire record collection under one key, matching
/// the original gateway's file layout so existing logs load unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    messages: Vec<MessageRecord>,
}

/// Snapshot-backed message log.
///
/// The full collection lives in memory and is rewritten to one JSON file
/// after every append. A single mutex guards both the vec and the
/// rewrite, so concurrent appends cannot interleave their snapshots
/// (single-writer discipline). Swapping in segmented or incremental
/// persistence later only touches this type, not the trait.
#[derive(Debug)]
pub struct SnapshotLog {
    path: PathBuf,
    records: Mutex<Vec<MessageRecord>>,
}

impl SnapshotLog {
    /// Load the snapshot at `path`, or start empty if the file does not
    /// exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let doc: SnapshotDocument =
                    serde_json::from_slice(&bytes).map_err(|e| Error::Corrupt {
                        path: path.clone(),
                        source: e,
                    })?;
                info!(path = %path.display(), records = doc.messages.len(), "loaded message log");
                doc.messages
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no message log yet, starting empty");
                Vec::new()
            },
            Err(e) => {
                return Err(Error::Load { path, source: e });
            },
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Rewrite the whole snapshot file from the given records.
    async fn persist(&self, records: &[MessageRecord]) -> Result<()> {
        let doc = serde_json::to_vec(&SnapshotDocument {
            messages: records.to_vec(),
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Persistence {
                    path: self.path.clone(),
                    source: e,
                })?;
        }
        tokio::fs::write(&self.path, doc)
            .await
            .map_err(|e| Error::Persistence {
                path: self.path.clone(),
                source: e,
            })
    }

    /// The snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageLog for SnapshotLog {
    async fn append(&self, record: MessageRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.push(record);
        // Persist inside the lock: appends serialize through here, so a
        // later rewrite can never clobber an earlier one.
        self.persist(&records).await
    }

    async fn all(&self) -> Vec<MessageRecord> {
        self.records.lock().await.clone()
    }

    async fn find_by_id(&self, id: &str) -> Option<MessageRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    async fn search(
        &self,
        query: &str,
        chat: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<MessageRecord> {
        let needle = query.to_lowercase();
        let records = self.records.lock().await;
        let matches: Vec<MessageRecord> = records
            .iter()
            .filter(|r| {
                if let Some(chat) = chat {
                    let hit = r.from.as_deref() == Some(chat) || r.to.as_deref() == Some(chat);
                    if !hit {
                        return false;
                    }
                }
                if !needle.is_empty() {
                    return r
                        .body
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(&needle));
                }
                true
            })
            .cloned()
            .collect();

        // Tail of the filtered matches, not of the whole log.
        match limit {
            Some(n) if n < matches.len() => matches[matches.len() - n..].to_vec(),
            _ => matches,
        }
    }
}
