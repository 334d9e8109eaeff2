//! # PgEmbeddingStore
//!
//! Embedding storage backed by the `embeddings` table in PostgreSQL.
use std::future::Future;
use std::time;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;
use tracing::instrument;

use crate::config::Config;
use crate::datacenters::DatacenterSet;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::metrics_consts::{
    DATACENTER_REMOVALS, DIFF_ROWS_RETURNED, STORE_OPERATIONS, STORE_OPERATION_DURATION,
};
use crate::ops::{diff, replicas, store};
use crate::repository::EmbeddingRepository;
use crate::types::{Embedding, InsertOrUpdateEmbedding, Model};

pub struct PgEmbeddingStore {
    pool: PgPool,
    query_timeout: time::Duration,
}

impl PgEmbeddingStore {
    /// Connect a new pool from configuration.
    pub async fn from_config(config: &Config) -> EmbeddingResult<Self> {
        let pool = config
            .connect()
            .await
            .map_err(|error| EmbeddingError::PoolCreationError { error })?;

        Ok(Self::from_pool(pool, config.query_timeout.0))
    }

    /// Use an existing pool. Every operation is abandoned, with `EmbeddingError::Timeout`,
    /// if it hasn't completed within `query_timeout`.
    pub fn from_pool(pool: PgPool, query_timeout: time::Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn begin(&self) -> EmbeddingResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| EmbeddingError::query("BEGIN", error))
    }

    /// Run one store operation under the deadline, recording its outcome.
    /// Writes run inside a transaction that is only committed within the deadline: a timed out
    /// write drops the transaction, which rolls it back.
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> EmbeddingResult<T>
    where
        F: Future<Output = EmbeddingResult<T>>,
    {
        let start = time::Instant::now();

        let result = match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout {
                command: operation.to_owned(),
                timeout: self.query_timeout,
            }),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_client_error() => "client_error",
            Err(EmbeddingError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        metrics::counter!(STORE_OPERATIONS, "operation" => operation, "outcome" => outcome)
            .increment(1);
        metrics::histogram!(STORE_OPERATION_DURATION, "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        match &result {
            Err(e) if e.is_client_error() => {
                tracing::warn!("rejected {} request: {}", operation, e)
            }
            Err(e) => tracing::error!("{} failed: {}", operation, e),
            Ok(_) => {}
        }

        result
    }
}

#[async_trait]
impl EmbeddingRepository for PgEmbeddingStore {
    #[instrument(skip(self, request), fields(file_id = request.file_id, model = %request.model))]
    async fn upsert(
        &self,
        owner_id: i64,
        request: &InsertOrUpdateEmbedding,
        size: i64,
        version: i32,
        datacenter: &str,
    ) -> EmbeddingResult<Embedding> {
        self.run("upsert", async {
            let mut tx = self.begin().await?;
            let embedding =
                store::upsert(&mut *tx, owner_id, request, size, version, datacenter).await?;
            commit(tx).await?;
            Ok::<_, EmbeddingError>(embedding)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_diff(
        &self,
        owner_id: i64,
        model: Model,
        since_time: i64,
        limit: i16,
    ) -> EmbeddingResult<Vec<Embedding>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let embeddings = self
            .run(
                "get_diff",
                diff::get_diff(&self.pool, owner_id, model, since_time, limit),
            )
            .await?;

        metrics::counter!(DIFF_ROWS_RETURNED, "model" => model.as_str())
            .increment(embeddings.len() as u64);

        Ok(embeddings)
    }

    #[instrument(skip(self, file_ids), fields(files = file_ids.len()))]
    async fn get_files_embedding(
        &self,
        owner_id: i64,
        model: Model,
        file_ids: &[i64],
    ) -> EmbeddingResult<Vec<Embedding>> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.run(
            "get_files_embedding",
            diff::get_files_embedding(&self.pool, owner_id, model, file_ids),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, file_id: i64) -> EmbeddingResult<()> {
        let deleted = self
            .run("delete", async {
                let mut tx = self.begin().await?;
                let deleted = store::delete_by_file(&mut *tx, file_id).await?;
                commit(tx).await?;
                Ok::<_, EmbeddingError>(deleted)
            })
            .await?;

        tracing::debug!(deleted, "deleted file embeddings");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, owner_id: i64) -> EmbeddingResult<()> {
        let deleted = self
            .run("delete_all", async {
                let mut tx = self.begin().await?;
                let deleted = store::delete_by_owner(&mut *tx, owner_id).await?;
                commit(tx).await?;
                Ok::<_, EmbeddingError>(deleted)
            })
            .await?;

        tracing::info!(deleted, "deleted all embeddings of owner");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_datacenters(&self, file_id: i64) -> EmbeddingResult<DatacenterSet> {
        self.run(
            "get_datacenters",
            replicas::get_datacenters(&self.pool, file_id),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn remove_datacenter(&self, file_id: i64, datacenter: &str) -> EmbeddingResult<()> {
        let removed = self
            .run("remove_datacenter", async {
                let mut tx = self.begin().await?;
                let removed = replicas::remove_datacenter(&mut *tx, file_id, datacenter).await?;
                commit(tx).await?;
                Ok::<_, EmbeddingError>(removed)
            })
            .await?;

        metrics::counter!(DATACENTER_REMOVALS).increment(removed);
        tracing::debug!(removed, "removed datacenter from file embeddings");
        Ok(())
    }
}

async fn commit(tx: Transaction<'static, Postgres>) -> EmbeddingResult<()> {
    tx.commit()
        .await
        .map_err(|error| EmbeddingError::query("COMMIT", error))
}
