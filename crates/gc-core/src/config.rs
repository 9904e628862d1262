use serde::{Deserialize, Serialize};

use crate::error::{GcError, Result};

/// Scan strategy used by the motif scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Count every window of every length in the range.
    Naive,
    /// Rolling-hash scan, single window length only.
    FixedLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    pub base: u64,
    pub prime: u64,
}

impl Default for HashParams {
    fn default() -> Self {
        Self { base: 256, prime: 101 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub min_frequency: usize,
    pub top_k: usize,
    /// Number of leading blocks promoted to seeds when no motif is frequent.
    pub seed_fallback: usize,
    /// Forced strategy; `None` selects by window bounds.
    pub strategy: Option<ScanStrategy>,
    pub hash: HashParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_frequency: 2,
            top_k: 5,
            seed_fallback: 5,
            strategy: None,
            hash: HashParams::default(),
        }
    }
}

/// Identifiers stamped into container metadata on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    pub author: String,
    pub generator: String,
    pub generator_version: String,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            author: "gene-codec".into(),
            generator: "GENOME_COMPRESSOR".into(),
            generator_version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub block_size: usize,
    pub scan: ScanConfig,
    pub provenance: ProvenanceConfig,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            scan: ScanConfig::default(),
            provenance: ProvenanceConfig::default(),
        }
    }
}

impl CodecConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(GcError::InvalidConfig("block_size must be at least 1".into()));
        }
        if self.scan.hash.prime == 0 {
            return Err(GcError::InvalidConfig("hash prime must be non-zero".into()));
        }
        Ok(())
    }
}
