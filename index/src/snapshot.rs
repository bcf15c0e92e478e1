//! JSON snapshots of encoder output.
//!
//! A snapshot is what the upstream encoder hands over: one embedding per
//! image, optionally the image's category and a display name. Names are
//! carried for the caller only; the index never reads them.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{IndexError, Result};
use crate::index::SimilarityIndex;
use crate::matrix::EmbeddingMatrix;

/// Category label as it appears in a snapshot file.
///
/// Accepts both integer class ids and string names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Id(i64),
    Name(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Id(id) => write!(f, "{id}"),
            Label::Name(name) => f.write_str(name),
        }
    }
}

/// Embeddings plus optional labels and names, as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSnapshot<L = Label> {
    /// One vector per item.
    pub embeddings: Vec<Embedding>,

    /// Category of each item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<L>>,

    /// Display name of each item (e.g. the source image's file name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

impl<L> EmbeddingSnapshot<L> {
    /// Create a snapshot without labels or names.
    pub fn new(embeddings: Vec<Embedding>) -> Self {
        Self {
            embeddings,
            labels: None,
            names: None,
        }
    }

    /// Attach labels.
    pub fn with_labels(mut self, labels: Vec<L>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Attach display names.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Check if the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Display name for an item, if names were supplied.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.as_ref()?.get(index).map(String::as_str)
    }

    fn check_names(&self) -> Result<()> {
        match &self.names {
            Some(names) if names.len() != self.embeddings.len() => {
                Err(IndexError::NameCountMismatch {
                    names: names.len(),
                    items: self.embeddings.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Build a similarity index from the snapshot.
    ///
    /// Runs full validation; names are dropped.
    pub fn into_index(self) -> Result<SimilarityIndex<L>> {
        self.check_names()?;
        let embeddings = EmbeddingMatrix::from_rows(self.embeddings)?;
        SimilarityIndex::from_parts(embeddings, self.labels)
    }
}

impl<L: DeserializeOwned> EmbeddingSnapshot<L> {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.check_names()?;
        debug!("Parsed snapshot with {} embeddings", snapshot.len());
        Ok(snapshot)
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        info!(
            "Loaded {} embeddings from {}",
            snapshot.len(),
            path.display()
        );
        Ok(snapshot)
    }
}

impl<L: Serialize> EmbeddingSnapshot<L> {
    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the snapshot to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!("Saved {} embeddings to {}", self.len(), path.display());
        Ok(())
    }
}
