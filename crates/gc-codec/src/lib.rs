//! Gene codec: motif-seeded block compression with mutation scripts.
//!
//! Stages:
//! 1. Motif scan (naive window count or rolling hash)
//! 2. Symbol encoding of motifs into seed genes (2 bits per symbol)
//! 3. Block assignment: first gene within the mutation threshold, else a
//!    new dynamic gene
//! 4. Decode: replay each block's mutation script against its gene
//!
//! The functions at the crate root are the entry points for front ends.

pub mod compressor;
pub mod decompressor;
pub mod mutation;
pub mod scanner;
pub mod symbols;

pub use compressor::Compressor;
pub use decompressor::{decode, decode_from_file, decode_with_report, DecodeReport};
pub use scanner::{split_into_blocks, MotifScanner, MotifTable};
pub use symbols::SymbolCodec;

use anyhow::anyhow;
use std::path::Path;
use tracing::info;

use gc_core::{CodecConfig, Document, GcError, Result};
use gc_store::{file_store, Container};

/// Compress `text` with default settings and the given block size.
pub fn compress(text: &str, block_size: usize) -> Result<Document> {
    Compressor::with_block_size(block_size)?.compress(text)
}

/// Load a container and decode it.
pub fn decompress_from_container(path: impl AsRef<Path>) -> Result<String> {
    decode_from_file(path)
}

/// Read an input file, trimmed of surrounding whitespace.
///
/// Missing files are `InputNotFound`; files with nothing but whitespace are
/// `EmptyInput`.
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let raw = file_store::read(path)?;
    let text = String::from_utf8(raw).map_err(|e| anyhow!("{} is not valid UTF-8: {e}", path.display()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GcError::EmptyInput { path: path.display().to_string() });
    }
    Ok(trimmed.to_string())
}

/// Read and compress a file, recording its name in the metadata.
pub fn compress_file(path: impl AsRef<Path>, config: &CodecConfig) -> Result<Document> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let mut document = Compressor::new(config.clone())?.compress(&text)?;
    document.metadata.source_filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(document)
}

/// Compress `input` and write the container to `output`.
pub fn compress_to_container(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<Document> {
    let document = compress_file(input, config)?;
    Container::new(config.provenance.clone()).save(&document, output.as_ref())?;
    info!(output = %output.as_ref().display(), genes = document.genes.len(), "container written");
    Ok(document)
}
