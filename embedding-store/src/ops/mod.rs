// Raw queries against the embeddings table. Each takes any executor, so callers can run them
// on the pool or inside a transaction; the store types wrap them with deadlines, logging and metrics.
pub mod diff;
pub mod replicas;
pub mod store;
