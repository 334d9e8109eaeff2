use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::datacenters::DatacenterSet;
use crate::error::EmbeddingError;

/// Version assumed for rows that were written before embeddings were versioned.
pub const DEFAULT_EMBEDDING_VERSION: i32 = 1;

/// The embedding algorithm (and version family) that produced an embedding.
/// Backed by the `model` enum type in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(type_name = "model")]
pub enum Model {
    #[sqlx(rename = "ggml-clip")]
    GgmlClip,
    #[sqlx(rename = "onnx-clip")]
    OnnxClip,
    #[sqlx(rename = "file-ml-clip-face")]
    FileMlClipFace,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::GgmlClip, Model::OnnxClip, Model::FileMlClipFace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::GgmlClip => "ggml-clip",
            Model::OnnxClip => "onnx-clip",
            Model::FileMlClipFace => "file-ml-clip-face",
        }
    }
}

/// Allow casting Model from strings. Anything outside the enumeration is user input we reject.
impl FromStr for Model {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| EmbeddingError::InvalidModel(s.to_owned()))
    }
}

impl TryFrom<String> for Model {
    type Error = EmbeddingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.as_str().to_owned()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write of one embedding, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOrUpdateEmbedding {
    #[serde(rename = "fileID")]
    pub file_id: i64,
    pub model: Model,
    pub encrypted_embedding: String,
    pub decryption_header: String,
}

/// One embedding per (file, model) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embedding {
    #[serde(rename = "fileID")]
    pub file_id: i64,
    #[serde(skip)]
    pub owner_id: i64,
    pub model: Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_embedding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decryption_header: Option<String>,
    pub size: i64,
    pub version: i32,
    /// Microseconds since the epoch; the diff sync cursor.
    pub updated_at: i64,
    #[serde(skip)]
    pub datacenters: DatacenterSet,
}

/// The raw row shape of the `embeddings` table.
#[derive(sqlx::FromRow)]
pub(crate) struct EmbeddingRow {
    pub file_id: i64,
    pub owner_id: i64,
    pub model: Model,
    pub encrypted_embedding: Option<String>,
    pub decryption_header: Option<String>,
    pub size: i64,
    pub version: Option<i32>,
    pub updated_at: i64,
    pub datacenters: Vec<String>,
}

impl From<EmbeddingRow> for Embedding {
    fn from(row: EmbeddingRow) -> Self {
        Self {
            file_id: row.file_id,
            owner_id: row.owner_id,
            model: row.model,
            encrypted_embedding: non_empty(row.encrypted_embedding),
            decryption_header: non_empty(row.decryption_header),
            size: row.size,
            version: row.version.unwrap_or(DEFAULT_EMBEDDING_VERSION),
            updated_at: row.updated_at,
            datacenters: DatacenterSet::from(row.datacenters),
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
