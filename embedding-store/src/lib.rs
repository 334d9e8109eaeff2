mod ops;

// Types
mod datacenters;
pub use datacenters::DatacenterSet;
pub use datacenters::LEGACY_DATACENTER;
mod types;
pub use types::Embedding;
pub use types::InsertOrUpdateEmbedding;
pub use types::Model;
pub use types::DEFAULT_EMBEDDING_VERSION;

// Errors
mod error;
// InvalidModel and OwnerMismatch are the caller's fault, everything else is ours
pub use error::EmbeddingError;
pub use error::EmbeddingResult;

// Config
pub mod config;
pub use config::Config;

// Storage
mod repository;
pub use repository::EmbeddingRepository;
mod pg;
pub use pg::PgEmbeddingStore;
mod memory;
pub use memory::MemoryEmbeddingStore;

// Diff sync client
mod sync;
pub use sync::walk_diff;
pub use sync::DiffWalk;

mod metrics_consts;
