//! Client side of the diff sync protocol: keep asking for changes after the last `updated_at`
//! seen until a page comes back short.
use crate::error::EmbeddingResult;
use crate::repository::EmbeddingRepository;
use crate::types::{Embedding, Model};

#[derive(Debug, Default)]
pub struct DiffWalk {
    /// Every change seen, in the order it was returned.
    pub embeddings: Vec<Embedding>,
    /// The `since_time` to resume from next time.
    pub cursor: i64,
    /// Number of get_diff calls made, including the final short page.
    pub pages: usize,
}

pub async fn walk_diff<R>(
    repo: &R,
    owner_id: i64,
    model: Model,
    since_time: i64,
    page_size: i16,
) -> EmbeddingResult<DiffWalk>
where
    R: EmbeddingRepository + ?Sized,
{
    let mut walk = DiffWalk {
        cursor: since_time,
        ..Default::default()
    };

    if page_size <= 0 {
        return Ok(walk);
    }

    loop {
        let page = repo
            .get_diff(owner_id, model, walk.cursor, page_size)
            .await?;
        walk.pages += 1;

        let caught_up = page.len() < page_size as usize;
        if let Some(last) = page.last() {
            walk.cursor = last.updated_at;
        }
        walk.embeddings.extend(page);

        tracing::debug!(
            pages = walk.pages,
            cursor = walk.cursor,
            seen = walk.embeddings.len(),
            "fetched diff page"
        );

        if caught_up {
            return Ok(walk);
        }
    }
}
