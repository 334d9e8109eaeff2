use std::time::Duration;

use embedding_store::{InsertOrUpdateEmbedding, Model, PgEmbeddingStore};
use sqlx::PgPool;

#[allow(dead_code)]
pub fn create_request(file_id: i64, model: Model) -> InsertOrUpdateEmbedding {
    InsertOrUpdateEmbedding {
        file_id,
        model,
        encrypted_embedding: "ZW5jcnlwdGVkLWVtYmVkZGluZw==".to_string(),
        decryption_header: "ZGVjcnlwdGlvbi1oZWFkZXI=".to_string(),
    }
}

#[allow(dead_code)]
pub fn store_from_pool(db: PgPool) -> PgEmbeddingStore {
    // Generous, CI databases can be slow to hand out the first connection
    PgEmbeddingStore::from_pool(db, Duration::from_secs(30))
}

#[allow(dead_code)]
pub fn sorted(datacenters: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut datacenters: Vec<String> = datacenters.into_iter().collect();
    datacenters.sort();
    datacenters
}
