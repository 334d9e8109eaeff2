use async_trait::async_trait;

use crate::datacenters::DatacenterSet;
use crate::error::EmbeddingResult;
use crate::types::{Embedding, InsertOrUpdateEmbedding, Model};

/// Data access for embeddings. Implemented on top of Postgres by `PgEmbeddingStore`, and in
/// process by `MemoryEmbeddingStore`; both follow the same merge and sync rules.
#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    /// Create the embedding for (file, model), or merge into the existing one: updated_at moves
    /// forward, size and version are overwritten and `datacenter` joins the replica set.
    async fn upsert(
        &self,
        owner_id: i64,
        request: &InsertOrUpdateEmbedding,
        size: i64,
        version: i32,
        datacenter: &str,
    ) -> EmbeddingResult<Embedding>;

    /// Up to `limit` embeddings changed after `since_time`, ordered by updated_at.
    async fn get_diff(
        &self,
        owner_id: i64,
        model: Model,
        since_time: i64,
        limit: i16,
    ) -> EmbeddingResult<Vec<Embedding>>;

    /// Embeddings of the given files. Missing ids are skipped, and each record is returned at most
    /// once even if its id is repeated.
    async fn get_files_embedding(
        &self,
        owner_id: i64,
        model: Model,
        file_ids: &[i64],
    ) -> EmbeddingResult<Vec<Embedding>>;

    /// Removes the file's embeddings for every model. Missing files are not an error.
    async fn delete(&self, file_id: i64) -> EmbeddingResult<()>;

    /// Removes every embedding of an account.
    async fn delete_all(&self, owner_id: i64) -> EmbeddingResult<()>;

    /// Union of the datacenters across all of the file's embeddings.
    async fn get_datacenters(&self, file_id: i64) -> EmbeddingResult<DatacenterSet>;

    /// Drops a datacenter from all of the file's embeddings, without touching updated_at.
    async fn remove_datacenter(&self, file_id: i64, datacenter: &str) -> EmbeddingResult<()>;
}
