//! TOML configuration for `ringctl`.
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults (CRC-32 positions, no nodes, `info` logging).

use std::path::Path;

use anyhow::Context;
use ringmap_placement::{Blake3Hasher, Crc32Hasher, KeyHasher, Ring};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring membership and hashing.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Hash used to position nodes and keys.
    pub hash: HashKind,
    /// Node identifiers placed on the ring.
    pub nodes: Vec<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Hash algorithm selectable from the config file or the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// CRC-32 (IEEE).
    #[default]
    Crc32,
    /// First 4 bytes of BLAKE3.
    Blake3,
}

impl KeyHasher for HashKind {
    fn hash(&self, data: &[u8]) -> u32 {
        match self {
            HashKind::Crc32 => Crc32Hasher.hash(data),
            HashKind::Blake3 => Blake3Hasher.hash(data),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("cannot read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reject node lists the ring cannot represent meaningfully.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(pos) = self.ring.nodes.iter().position(|n| n.trim().is_empty()) {
            anyhow::bail!("node #{pos} has an empty identifier");
        }
        Ok(())
    }

    /// Build a ring holding every configured node.
    pub fn build_ring(&self) -> Ring<HashKind> {
        let ring = Ring::with_hasher(self.ring.hash);
        for node in &self.ring.nodes {
            ring.add_node(node.as_str());
        }
        ring
    }
}
