use crate::error::{is_invalid_enum_value, EmbeddingError, EmbeddingResult};
use crate::types::{non_empty, Embedding, EmbeddingRow, InsertOrUpdateEmbedding};

use super::diff::EMBEDDING_COLUMNS;

/// Insert an embedding, or merge into the existing record for the same (file, model).
///
/// The merge happens inside the upsert statement itself, so two concurrent uploads of the same
/// embedding to different datacenters both end up in the set. On conflict:
/// - updated_at moves forward, even if the clock didn't
/// - size and version are overwritten
/// - the datacenter is appended unless already present
///
/// A record owned by someone else is left untouched and reported as `OwnerMismatch`.
pub async fn upsert<'c, E>(
    executor: E,
    owner_id: i64,
    request: &InsertOrUpdateEmbedding,
    size: i64,
    version: i32,
    datacenter: &str,
) -> EmbeddingResult<Embedding>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let query = format!(
        r#"
INSERT INTO embeddings
    (file_id, owner_id, model, size, version, datacenters)
VALUES
    ($1, $2, $3, $4, $5, ARRAY[$6::TEXT])
ON CONFLICT ON CONSTRAINT unique_embeddings_file_id_model
DO UPDATE
SET
    updated_at = GREATEST(now_utc_micro_seconds(), embeddings.updated_at + 1),
    size = EXCLUDED.size,
    version = EXCLUDED.version,
    datacenters = CASE
        WHEN $6::TEXT = ANY(embeddings.datacenters) THEN embeddings.datacenters
        ELSE array_append(embeddings.datacenters, $6::TEXT)
    END
WHERE
    embeddings.owner_id = EXCLUDED.owner_id
RETURNING
    {EMBEDDING_COLUMNS}
        "#
    );

    let row: Option<EmbeddingRow> = sqlx::query_as(&query)
        .bind(request.file_id)
        .bind(owner_id)
        .bind(request.model)
        .bind(size)
        .bind(version)
        .bind(datacenter)
        .fetch_optional(executor)
        .await
        .map_err(|error| {
            if is_invalid_enum_value(&error) {
                EmbeddingError::InvalidModel(request.model.to_string())
            } else {
                EmbeddingError::query("UPSERT", error)
            }
        })?;

    let row = row.ok_or(EmbeddingError::OwnerMismatch {
        file_id: request.file_id,
        model: request.model,
    })?;

    // The payload itself goes to object storage, the row only tracks where it is.
    let mut embedding = Embedding::from(row);
    embedding.encrypted_embedding = non_empty(Some(request.encrypted_embedding.clone()));
    embedding.decryption_header = non_empty(Some(request.decryption_header.clone()));

    Ok(embedding)
}

/// Delete every model's embedding for a file. Returns the number of records removed.
pub async fn delete_by_file<'c, E>(executor: E, file_id: i64) -> EmbeddingResult<u64>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let result = sqlx::query("DELETE FROM embeddings WHERE file_id = $1")
        .bind(file_id)
        .execute(executor)
        .await
        .map_err(|error| EmbeddingError::query("DELETE", error))?;

    Ok(result.rows_affected())
}

/// Delete every embedding owned by an account, across all models.
pub async fn delete_by_owner<'c, E>(executor: E, owner_id: i64) -> EmbeddingResult<u64>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let result = sqlx::query("DELETE FROM embeddings WHERE owner_id = $1")
        .bind(owner_id)
        .execute(executor)
        .await
        .map_err(|error| EmbeddingError::query("DELETE", error))?;

    Ok(result.rows_affected())
}
