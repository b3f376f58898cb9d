//! Document persistence.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// Upsert-by-slug document storage, one collection per content type.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert the document or merge its fields over the stored one.
    ///
    /// Calling this repeatedly with the same input leaves the store in the
    /// same state as calling it once.
    async fn upsert(&self, collection: &str, slug: &str, data: &Map<String, Value>) -> StoreResult<()>;
}
