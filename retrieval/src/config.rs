//! Configuration for retrieval evaluation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Neighbor count used by the evaluation when none is configured.
pub const DEFAULT_K: usize = 5;

/// Configuration for evaluation and similar-item queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Cut-off for precision@k.
    pub k: usize,

    /// Number of neighbors returned for a similar-item query.
    pub query_k: usize,

    /// Hide query results scoring below this value.
    ///
    /// Display filter only; precision always uses the full top-k.
    pub min_score: Option<f32>,
}

impl RetrievalConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the precision cut-off.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the number of neighbors per query.
    pub fn with_query_k(mut self, query_k: usize) -> Self {
        self.query_k = query_k;
        self
    }

    /// Set the minimum displayed score.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Check the values that do not depend on the corpus.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RetrievalError::Config("k must be at least 1".to_string()));
        }
        if self.query_k == 0 {
            return Err(RetrievalError::Config(
                "query_k must be at least 1".to_string(),
            ));
        }
        if let Some(min_score) = self.min_score.filter(|s| !(-1.0..=1.0).contains(s)) {
            return Err(RetrievalError::Config(format!(
                "min_score {min_score} is outside the cosine range [-1, 1]"
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            query_k: DEFAULT_K,
            min_score: None,
        }
    }
}
