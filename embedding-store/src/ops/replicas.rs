use crate::datacenters::DatacenterSet;
use crate::error::{EmbeddingError, EmbeddingResult};

/// Every datacenter holding a copy of any of the file's embeddings.
pub async fn get_datacenters<'c, E>(executor: E, file_id: i64) -> EmbeddingResult<DatacenterSet>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let per_model: Vec<Vec<String>> =
        sqlx::query_scalar("SELECT datacenters FROM embeddings WHERE file_id = $1")
            .bind(file_id)
            .fetch_all(executor)
            .await
            .map_err(|error| EmbeddingError::query("SELECT", error))?;

    // Each record is deduplicated already, but two models can share a region.
    Ok(per_model
        .iter()
        .flatten()
        .map(String::as_str)
        .collect())
}

/// Drop a datacenter from all of the file's embeddings. updated_at is not touched, so this never
/// shows up in diff sync.
/// Returns the number of records that had the datacenter.
pub async fn remove_datacenter<'c, E>(
    executor: E,
    file_id: i64,
    datacenter: &str,
) -> EmbeddingResult<u64>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let result = sqlx::query(
        r#"
UPDATE
    embeddings
SET
    datacenters = array_remove(datacenters, $1::TEXT)
WHERE
    file_id = $2 AND $1::TEXT = ANY(datacenters)
        "#,
    )
    .bind(datacenter)
    .bind(file_id)
    .execute(executor)
    .await
    .map_err(|error| EmbeddingError::query("UPDATE", error))?;

    Ok(result.rows_affected())
}
