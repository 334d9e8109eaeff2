use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::datacenters::DatacenterSet;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::repository::EmbeddingRepository;
use crate::types::{non_empty, Embedding, InsertOrUpdateEmbedding, Model};

#[derive(Default)]
struct State {
    records: HashMap<(i64, Model), Embedding>,
    // Last timestamp handed out, so every write gets a strictly greater one.
    clock: i64,
}

impl State {
    fn tick(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or_default();
        self.clock = now.max(self.clock + 1);
        self.clock
    }
}

/// An in-process embedding store with the same merge and sync semantics as the Postgres one.
///
/// Every operation runs under a single lock, which makes the upsert merge atomic.
/// The lock is never held across an await point.
#[derive(Default)]
pub struct MemoryEmbeddingStore {
    state: Mutex<State>,
}

impl MemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock can't leave a record half-written, so keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EmbeddingRepository for MemoryEmbeddingStore {
    async fn upsert(
        &self,
        owner_id: i64,
        request: &InsertOrUpdateEmbedding,
        size: i64,
        version: i32,
        datacenter: &str,
    ) -> EmbeddingResult<Embedding> {
        let mut state = self.lock();
        let updated_at = state.tick();

        let key = (request.file_id, request.model);
        let record = match state.records.get_mut(&key) {
            Some(existing) => {
                if existing.owner_id != owner_id {
                    return Err(EmbeddingError::OwnerMismatch {
                        file_id: request.file_id,
                        model: request.model,
                    });
                }
                existing.updated_at = updated_at;
                existing.size = size;
                existing.version = version;
                existing.datacenters.insert(datacenter);
                existing.clone()
            }
            None => {
                let mut datacenters = DatacenterSet::new();
                datacenters.insert(datacenter);
                let created = Embedding {
                    file_id: request.file_id,
                    owner_id,
                    model: request.model,
                    encrypted_embedding: None,
                    decryption_header: None,
                    size,
                    version,
                    updated_at,
                    datacenters,
                };
                state.records.insert(key, created.clone());
                created
            }
        };

        // Like the table, we only keep metadata; the payload is echoed back to the caller.
        Ok(Embedding {
            encrypted_embedding: non_empty(Some(request.encrypted_embedding.clone())),
            decryption_header: non_empty(Some(request.decryption_header.clone())),
            ..record
        })
    }

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

        let state = self.lock();
        let mut changed: Vec<Embedding> = state
            .records
            .values()
            .filter(|e| e.owner_id == owner_id && e.model == model && e.updated_at > since_time)
            .cloned()
            .collect();

        changed.sort_by_key(|e| e.updated_at);
        changed.truncate(limit as usize);

        Ok(changed)
    }

    async fn get_files_embedding(
        &self,
        owner_id: i64,
        model: Model,
        file_ids: &[i64],
    ) -> EmbeddingResult<Vec<Embedding>> {
        let state = self.lock();

        Ok(state
            .records
            .values()
            .filter(|e| {
                e.owner_id == owner_id && e.model == model && file_ids.contains(&e.file_id)
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, file_id: i64) -> EmbeddingResult<()> {
        self.lock().records.retain(|(id, _), _| *id != file_id);
        Ok(())
    }

    async fn delete_all(&self, owner_id: i64) -> EmbeddingResult<()> {
        self.lock().records.retain(|_, e| e.owner_id != owner_id);
        Ok(())
    }

    async fn get_datacenters(&self, file_id: i64) -> EmbeddingResult<DatacenterSet> {
        let state = self.lock();

        let mut datacenters = DatacenterSet::new();
        for embedding in state.records.values().filter(|e| e.file_id == file_id) {
            datacenters.union_with(&embedding.datacenters);
        }

        Ok(datacenters)
    }

    async fn remove_datacenter(&self, file_id: i64, datacenter: &str) -> EmbeddingResult<()> {
        let mut state = self.lock();

        for embedding in state.records.values_mut().filter(|e| e.file_id == file_id) {
            embedding.datacenters.remove(datacenter);
        }

        Ok(())
    }
}
