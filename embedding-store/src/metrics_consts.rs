// Labelled with "operation" and "outcome" (success, client_error, error, timeout)
pub const STORE_OPERATIONS: &str = "embedding_store_operations";
pub const STORE_OPERATION_DURATION: &str = "embedding_store_operation_duration_seconds";
// Rows handed back by the diff reader
pub const DIFF_ROWS_RETURNED: &str = "embedding_store_diff_rows_returned";
// Records that actually lost a region in remove_datacenter
pub const DATACENTER_REMOVALS: &str = "embedding_store_datacenter_removals";
