//! Shared model for the gene codec: documents, mutation scripts, errors and
//! configuration.

pub mod config;
pub mod document;
pub mod error;
pub mod mutation;

/// Container format version stamped on every save.
pub const FORMAT_VERSION: &str = "1.0";

pub use config::{CodecConfig, HashParams, ProvenanceConfig, ScanConfig, ScanStrategy};
pub use document::{BlockRecord, Document, GeneDictionary, GeneStats, Metadata};
pub use error::{GcError, Result};
pub use mutation::{MutationOp, MutationScript, ScriptToken};
