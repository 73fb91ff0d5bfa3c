use async_trait::async_trait;

use crate::{Result, record::MessageRecord};

/// Append-only, id-addressable log of message records.
///
/// Implementations serialize writes internally; callers never coordinate.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a record and persist. On a persistence error the in-memory
    /// log has still applied the append; callers decide whether to
    /// surface or swallow the failure.
    async fn append(&self, record: MessageRecord) -> Result<()>;

    /// All records in insertion (chronological) order.
    async fn all(&self) -> Vec<MessageRecord>;

    /// First record with a matching id.
    async fn find_by_id(&self, id: &str) -> Option<MessageRecord>;

    /// Filter records: `chat` matches on `from` or `to` equality, a
    /// non-empty `query` on case-insensitive body substring, and `limit`
    /// keeps only the last N matches in original order.
    async fn search(
        &self,
        query: &str,
        chat: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<MessageRecord>;
}
