//! Priority configuration
//!
//! Rank tables for document types and client segments, owned by the
//! prioritizer. The tables are explicit configuration (loadable from YAML
//! for per-deployment tuning) rather than hidden module constants; the
//! shipped defaults are the production tables.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Rank assigned to any type or segment absent from its table
fn default_rank() -> i64 {
    999
}

fn default_type_ranks() -> HashMap<String, i64> {
    HashMap::from([
        ("PASSPORT".to_string(), 1),
        ("NATIONAL-ID".to_string(), 2),
        ("POWER-OF-ATTORNEY".to_string(), 3),
        ("PROOF-OF-ADDRESS".to_string(), 4),
        ("TAX-CERTIFICATE".to_string(), 5),
        ("BANK-REFERENCE".to_string(), 6),
    ])
}

fn default_segment_ranks() -> HashMap<String, i64> {
    // "otros" is deliberately absent: unknown segments fall through to the
    // default rank, same as unknown document types.
    HashMap::from([
        ("privada".to_string(), 1),
        ("patrimonial".to_string(), 2),
        ("empresas".to_string(), 3),
        ("retail".to_string(), 4),
    ])
}

/// Rank tables driving the urgency score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Document type code -> rank (lower is more urgent)
    #[serde(default = "default_type_ranks")]
    pub type_ranks: HashMap<String, i64>,

    /// Client segment name -> rank (lower is more urgent)
    #[serde(default = "default_segment_ranks")]
    pub segment_ranks: HashMap<String, i64>,

    /// Rank for types and segments missing from the tables
    #[serde(default = "default_rank")]
    pub default_rank: i64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            type_ranks: default_type_ranks(),
            segment_ranks: default_segment_ranks(),
            default_rank: default_rank(),
        }
    }
}

impl PriorityConfig {
    /// Load a config from a YAML file
    ///
    /// Omitted tables fall back to the shipped defaults, so a deployment can
    /// override just the segment ranks (or nothing at all).
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read priority config: {:?}", path))?;

        let config: PriorityConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse priority config: {:?}", path))?;

        info!(
            "Loaded priority config from {:?}: {} document types, {} segments",
            path,
            config.type_ranks.len(),
            config.segment_ranks.len()
        );

        Ok(config)
    }

    /// Rank for a document type code
    pub fn type_rank(&self, document_type: &str) -> i64 {
        self.type_ranks
            .get(document_type)
            .copied()
            .unwrap_or(self.default_rank)
    }

    /// Rank for a segment name
    pub fn segment_rank(&self, segment: &str) -> i64 {
        self.segment_ranks
            .get(segment)
            .copied()
            .unwrap_or(self.default_rank)
    }
}
