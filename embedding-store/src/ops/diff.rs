use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::{Embedding, EmbeddingRow, Model};

pub(crate) const EMBEDDING_COLUMNS: &str = "file_id, owner_id, model, encrypted_embedding, decryption_header, size, version, updated_at, datacenters";

/// Embeddings of `model` owned by `owner_id` that changed after `since_time`, oldest change first.
pub async fn get_diff<'c, E>(
    executor: E,
    owner_id: i64,
    model: Model,
    since_time: i64,
    limit: i16,
) -> EmbeddingResult<Vec<Embedding>>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let query = format!(
        r#"
SELECT
    {EMBEDDING_COLUMNS}
FROM
    embeddings
WHERE
    owner_id = $1 AND model = $2 AND updated_at > $3
ORDER BY
    updated_at ASC
LIMIT $4
        "#
    );

    let rows: Vec<EmbeddingRow> = sqlx::query_as(&query)
        .bind(owner_id)
        .bind(model)
        .bind(since_time)
        .bind(i64::from(limit))
        .fetch_all(executor)
        .await
        .map_err(|error| EmbeddingError::query("SELECT", error))?;

    Ok(rows.into_iter().map(Embedding::from).collect())
}

/// Embeddings of `model` owned by `owner_id` for the given files. Unknown files are skipped.
pub async fn get_files_embedding<'c, E>(
    executor: E,
    owner_id: i64,
    model: Model,
    file_ids: &[i64],
) -> EmbeddingResult<Vec<Embedding>>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let query = format!(
        r#"
SELECT
    {EMBEDDING_COLUMNS}
FROM
    embeddings
WHERE
    owner_id = $1 AND model = $2 AND file_id = ANY($3)
        "#
    );

    let rows: Vec<EmbeddingRow> = sqlx::query_as(&query)
        .bind(owner_id)
        .bind(model)
        .bind(file_ids)
        .fetch_all(executor)
        .await
        .map_err(|error| EmbeddingError::query("SELECT", error))?;

    Ok(rows.into_iter().map(Embedding::from).collect())
}
