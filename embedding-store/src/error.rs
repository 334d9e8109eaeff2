use std::time;

use thiserror::Error;

use crate::types::Model;

/// Enumeration of errors for operations on the embeddings table.
/// Errors can originate from sqlx and are wrapped by us to provide additional context.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("{0} is not a valid embedding model")]
    InvalidModel(String),
    #[error("the {model} embedding of file {file_id} belongs to another owner")]
    OwnerMismatch { file_id: i64, model: Model },
    #[error("pool creation failed with: {error}")]
    PoolCreationError { error: sqlx::Error },
    #[error("{command} query failed with: {error}")]
    QueryError { command: String, error: sqlx::Error },
    #[error("{command} query did not complete within {timeout:?}")]
    Timeout {
        command: String,
        timeout: time::Duration,
    },
}

impl EmbeddingError {
    /// Whether the failure was caused by the caller's input, as opposed to the storage layer.
    /// Callers serving HTTP map this to a 4xx, and everything else to a 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EmbeddingError::InvalidModel(_) | EmbeddingError::OwnerMismatch { .. }
        )
    }

    pub(crate) fn query(command: &str, error: sqlx::Error) -> Self {
        EmbeddingError::QueryError {
            command: command.to_owned(),
            error,
        }
    }
}

pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;

/// Determines if a sqlx::Error is Postgres rejecting a value for an enum column.
pub(crate) fn is_invalid_enum_value(error: &sqlx::Error) -> bool {
    match error {
        // 22P02 = invalid_text_representation, raised for out-of-domain enum input
        sqlx::Error::Database(db_error) => db_error
            .code()
            .is_some_and(|code| code.as_ref() == "22P02"),
        _ => false,
    }
}
