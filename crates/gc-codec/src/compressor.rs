//! Block compressor: seeds genes from frequent motifs, then expresses each
//! block as a mutation of the first gene close enough to it.

use tracing::{debug, info};

use gc_core::document::dynamic_gene_id;
use gc_core::{BlockRecord, CodecConfig, Document, Metadata, Result};

use crate::mutation::find_closest_gene;
use crate::scanner::{split_into_blocks, MotifScanner};
use crate::symbols::{check_encodable, SymbolCodec};

#[derive(Debug, Clone)]
pub struct Compressor {
    config: CodecConfig,
    symbols: SymbolCodec,
}

impl Compressor {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, symbols: SymbolCodec::default() })
    }

    pub fn with_block_size(block_size: usize) -> Result<Self> {
        Self::new(CodecConfig::default().with_block_size(block_size))
    }

    pub fn with_symbols(mut self, symbols: SymbolCodec) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Build a fresh document for `text`.
    pub fn compress(&self, text: &str) -> Result<Document> {
        check_encodable(text)?;
        let block_size = self.config.block_size;
        let scan = &self.config.scan;

        let blocks = split_into_blocks(text, block_size)?;
        let scanner = MotifScanner::for_blocks(block_size, scan)?;
        let mut motifs = scanner.find_frequent_patterns(&blocks, scan.top_k);
        if motifs.is_empty() {
            motifs = blocks.iter().take(scan.seed_fallback).cloned().collect();
            debug!(seeds = motifs.len(), "no frequent motifs, seeding from leading blocks");
        } else {
            debug!(motifs = ?motifs, "frequent motifs found");
        }

        let mut genes = self.symbols.build_gene_dict(&motifs)?;
        let seed_count = genes.len();
        let max_mutations = block_size / 2;

        let mut records = Vec::with_capacity(blocks.len());
        for block in blocks {
            match find_closest_gene(&block, &genes, max_mutations) {
                Some((gene_id, script)) => records.push(BlockRecord::new(gene_id, script)),
                None => {
                    let gene_id = dynamic_gene_id(genes.len());
                    genes.insert(gene_id.clone(), block);
                    records.push(BlockRecord::verbatim(gene_id));
                }
            }
        }

        info!(
            chars = text.chars().count(),
            blocks = records.len(),
            seed_genes = seed_count,
            dynamic_genes = genes.len() - seed_count,
            "compression complete"
        );

        let metadata = Metadata::new(text.chars().count(), block_size);
        Ok(Document::new(genes, records, metadata))
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self { config: CodecConfig::default(), symbols: SymbolCodec::default() }
    }
}
