use std::collections::HashSet;

use common::{create_request, store_from_pool};
use embedding_store::{walk_diff, EmbeddingRepository, Model};
use sqlx::PgPool;

mod common;

#[sqlx::test(migrations = "./migrations")]
async fn test_get_diff_is_ordered_and_paginated(db: PgPool) {
    let store = store_from_pool(db);

    for file_id in 1..=5 {
        store
            .upsert(1, &create_request(file_id, Model::OnnxClip), 1, 1, "b2-eu-cen")
            .await
            .unwrap();
    }
    // Touching file 1 again moves it to the end of the diff
    store
        .upsert(1, &create_request(1, Model::OnnxClip), 1, 1, "scw-eu-fr")
        .await
        .unwrap();

    let page = store.get_diff(1, Model::OnnxClip, 0, 3).await.unwrap();
    assert_eq!(
        page.iter().map(|e| e.file_id).collect::<Vec<_>>(),
        vec![2, 3, 4]
    );
    assert!(page.windows(2).all(|w| w[0].updated_at < w[1].updated_at));

    let page = store
        .get_diff(1, Model::OnnxClip, page[2].updated_at, 3)
        .await
        .unwrap();
    assert_eq!(
        page.iter().map(|e| e.file_id).collect::<Vec<_>>(),
        vec![5, 1]
    );
    // The payload isn't stored in the row, so the diff only carries metadata
    assert_eq!(page[0].encrypted_embedding, None);
    assert_eq!(page[0].version, 1);

    let empty = store
        .get_diff(1, Model::OnnxClip, page[1].updated_at, 3)
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_walk_diff_sees_every_change_once(db: PgPool) {
    let store = store_from_pool(db);

    for file_id in 1..=17 {
        store
            .upsert(7, &create_request(file_id, Model::GgmlClip), 1, 1, "b2-eu-cen")
            .await
            .unwrap();
    }
    let checkpoint = store
        .get_diff(7, Model::GgmlClip, 0, 100)
        .await
        .unwrap()
        .last()
        .unwrap()
        .updated_at;

    for file_id in [3, 9, 18] {
        store
            .upsert(7, &create_request(file_id, Model::GgmlClip), 1, 2, "scw-eu-fr")
            .await
            .unwrap();
    }

    let full = walk_diff(&store, 7, Model::GgmlClip, 0, 4).await.unwrap();
    let unique: HashSet<i64> = full.embeddings.iter().map(|e| e.file_id).collect();
    assert_eq!(full.embeddings.len(), 18);
    assert_eq!(unique.len(), 18);
    assert_eq!(full.pages, 5);

    let incremental = walk_diff(&store, 7, Model::GgmlClip, checkpoint, 4)
        .await
        .unwrap();
    assert_eq!(
        incremental
            .embeddings
            .iter()
            .map(|e| e.file_id)
            .collect::<Vec<_>>(),
        vec![3, 9, 18]
    );
    assert_eq!(incremental.cursor, full.cursor);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reads_never_cross_owners_or_models(db: PgPool) {
    let store = store_from_pool(db);

    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "b2-eu-cen")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::FileMlClipFace), 1, 1, "b2-eu-cen")
        .await
        .unwrap();
    store
        .upsert(2, &create_request(20, Model::OnnxClip), 1, 1, "b2-eu-cen")
        .await
        .unwrap();

    let diff = store.get_diff(2, Model::OnnxClip, 0, 100).await.unwrap();
    assert_eq!(diff.iter().map(|e| e.file_id).collect::<Vec<_>>(), vec![20]);
    assert!(diff.iter().all(|e| e.owner_id == 2));

    let files = store
        .get_files_embedding(2, Model::OnnxClip, &[10, 20])
        .await
        .unwrap();
    assert_eq!(files.iter().map(|e| e.file_id).collect::<Vec<_>>(), vec![20]);

    let faces = store
        .get_files_embedding(1, Model::FileMlClipFace, &[10, 20, 404])
        .await
        .unwrap();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].model, Model::FileMlClipFace);

    let repeated = store
        .get_files_embedding(1, Model::OnnxClip, &[10, 10])
        .await
        .unwrap();
    assert_eq!(repeated.len(), 1);

    assert!(store
        .get_files_embedding(1, Model::OnnxClip, &[])
        .await
        .unwrap()
        .is_empty());
}
