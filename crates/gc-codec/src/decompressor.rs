//! Rebuild text from a document, block by block.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use gc_core::{Document, GcError, Result};
use gc_store::Container;

use crate::mutation::{apply, SkippedOp};

/// A skipped mutation token and the block it belonged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSkip {
    pub block: usize,
    pub op: SkippedOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub text: String,
    pub skipped: Vec<BlockSkip>,
}

pub fn decode(document: &Document) -> Result<String> {
    decode_with_report(document).map(|report| report.text)
}

/// Decode and collect every mutation token that could not be applied.
pub fn decode_with_report(document: &Document) -> Result<DecodeReport> {
    document.validate()?;
    let mut text = String::new();
    let mut skipped = Vec::new();

    for (block, record) in document.blocks.iter().enumerate() {
        let sequence = document.genes.get(&record.gene_id).ok_or_else(|| {
            GcError::DanglingGeneReference { block, gene: record.gene_id.clone() }
        })?;
        if !record.mutation.has_edits() {
            text.push_str(sequence);
            continue;
        }
        let rebuilt = apply(sequence, &record.mutation);
        skipped.extend(rebuilt.skipped.into_iter().map(|op| BlockSkip { block, op }));
        text.push_str(&rebuilt.text);
    }

    let decoded_len = text.chars().count();
    if decoded_len != document.metadata.original_length {
        warn!(
            expected = document.metadata.original_length,
            actual = decoded_len,
            "decoded length differs from original"
        );
    }
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "skipped mutation tokens during decode");
    }
    info!(blocks = document.blocks.len(), chars = decoded_len, "decompression complete");

    Ok(DecodeReport { text, skipped })
}

pub fn decode_from_file(path: impl AsRef<Path>) -> Result<String> {
    let document = Container::load(path)?;
    decode(&document)
}
