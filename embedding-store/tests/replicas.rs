use common::{create_request, sorted, store_from_pool};
use embedding_store::{EmbeddingRepository, Model};
use sqlx::PgPool;

mod common;

#[sqlx::test(migrations = "./migrations")]
async fn test_datacenters_are_unioned_across_models(db: PgPool) {
    let store = store_from_pool(db);

    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "b2-eu-cen")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "scw-eu-fr")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::FileMlClipFace), 1, 1, "scw-eu-fr")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::FileMlClipFace), 1, 1, "wasabi-eu-central-2")
        .await
        .unwrap();

    let datacenters = store.get_datacenters(10).await.unwrap();
    assert_eq!(
        sorted(datacenters.into_vec()),
        vec!["b2-eu-cen", "scw-eu-fr", "wasabi-eu-central-2"]
    );

    assert!(store.get_datacenters(404).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_remove_datacenter_only_touches_records_that_had_it(db: PgPool) {
    let store = store_from_pool(db);

    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "b2-eu-cen")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "scw-eu-fr")
        .await
        .unwrap();
    store
        .upsert(1, &create_request(10, Model::FileMlClipFace), 1, 1, "scw-eu-fr")
        .await
        .unwrap();
    let before = store.get_diff(1, Model::OnnxClip, 0, 10).await.unwrap();

    store.remove_datacenter(10, "b2-eu-cen").await.unwrap();

    let clip = store
        .get_files_embedding(1, Model::OnnxClip, &[10])
        .await
        .unwrap();
    assert_eq!(clip[0].datacenters.clone().into_vec(), vec!["scw-eu-fr"]);
    let faces = store
        .get_files_embedding(1, Model::FileMlClipFace, &[10])
        .await
        .unwrap();
    assert_eq!(faces[0].datacenters.clone().into_vec(), vec!["scw-eu-fr"]);

    // Replica bookkeeping is invisible to diff sync
    assert_eq!(clip[0].updated_at, before[0].updated_at);
    assert!(store
        .get_diff(1, Model::OnnxClip, before[0].updated_at, 10)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_remove_absent_datacenter_is_a_noop(db: PgPool) {
    let store = store_from_pool(db);

    store
        .remove_datacenter(404, "b2-eu-cen")
        .await
        .expect("removing from a missing file failed");

    store
        .upsert(1, &create_request(10, Model::OnnxClip), 1, 1, "b2-eu-cen")
        .await
        .unwrap();
    store.remove_datacenter(10, "scw-eu-fr").await.unwrap();

    assert_eq!(
        store.get_datacenters(10).await.unwrap().into_vec(),
        vec!["b2-eu-cen"]
    );
}
