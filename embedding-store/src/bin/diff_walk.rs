//! Walk the embedding diff of one owner and model against a live database, the same way a sync
//! client does, and check the changes come back strictly ordered.
use envconfig::Envconfig;
use eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

use embedding_store::{walk_diff, Config, Model, PgEmbeddingStore};

#[derive(Envconfig)]
struct WalkConfig {
    #[envconfig(nested = true)]
    store: Config,

    owner_id: i64,

    #[envconfig(default = "onnx-clip")]
    model: String,

    #[envconfig(default = "0")]
    since_time: i64,

    #[envconfig(default = "500")]
    page_size: i16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = WalkConfig::init_from_env()?;
    let model: Model = config.model.parse()?;

    let store = PgEmbeddingStore::from_config(&config.store).await?;

    let walk = walk_diff(
        &store,
        config.owner_id,
        model,
        config.since_time,
        config.page_size,
    )
    .await?;

    if let Some(pair) = walk
        .embeddings
        .windows(2)
        .find(|pair| pair[0].updated_at > pair[1].updated_at)
    {
        return Err(eyre!(
            "diff out of order: file {} at {} came before file {} at {}",
            pair[0].file_id,
            pair[0].updated_at,
            pair[1].file_id,
            pair[1].updated_at
        ));
    }

    let ties = walk
        .embeddings
        .windows(2)
        .filter(|pair| pair[0].updated_at == pair[1].updated_at)
        .count();
    if ties > 0 {
        tracing::warn!(ties, "embeddings share an updated_at, a page boundary may split them");
    }

    tracing::info!(
        owner_id = config.owner_id,
        model = %model,
        changes = walk.embeddings.len(),
        pages = walk.pages,
        cursor = walk.cursor,
        "caught up"
    );

    Ok(())
}
