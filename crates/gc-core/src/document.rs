//! Compressed document model: gene dictionary, block records, metadata.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::error::{GcError, Result};
use crate::mutation::MutationScript;

/// Top-level keys every container must carry.
pub const REQUIRED_KEYS: [&str; 3] = ["genes", "blocks", "metadata"];

pub const SEED_GENE_PREFIX: &str = "G";
pub const DYNAMIC_GENE_PREFIX: &str = "G_dyn_";

pub fn seed_gene_id(ordinal: usize) -> String {
    format!("{SEED_GENE_PREFIX}{ordinal}")
}

pub fn dynamic_gene_id(gene_count: usize) -> String {
    format!("{DYNAMIC_GENE_PREFIX}{gene_count}")
}

pub fn is_dynamic_gene(id: &str) -> bool {
    id.starts_with(DYNAMIC_GENE_PREFIX)
}

/// Insertion-ordered gene id → sequence map.
///
/// Order matters: first-fit matching walks genes in this order and the
/// container writes them in it. Loading keeps file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneDictionary {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl GeneDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced gene keeps its position.
    pub fn insert(&mut self, id: impl Into<String>, sequence: impl Into<String>) -> Option<String> {
        let id = id.into();
        let sequence = sequence.into();
        if let Some(&pos) = self.index.get(&id) {
            return Some(std::mem::replace(&mut self.entries[pos].1, sequence));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, sequence));
        None
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, seq)| (id.as_str(), seq.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GeneDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (id, seq) in iter {
            dict.insert(id, seq);
        }
        dict
    }
}

impl Serialize for GeneDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, seq) in &self.entries {
            map.serialize_entry(id, seq)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GeneDictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct GeneVisitor;

        impl<'de> Visitor<'de> for GeneVisitor {
            type Value = GeneDictionary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of gene id to sequence")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut dict = GeneDictionary::new();
                while let Some((id, seq)) = access.next_entry::<String, String>()? {
                    if dict.contains(&id) {
                        return Err(serde::de::Error::custom(format!("duplicate gene id {id}")));
                    }
                    dict.insert(id, seq);
                }
                Ok(dict)
            }
        }

        deserializer.deserialize_map(GeneVisitor)
    }
}

/// One block of the original input, expressed against a gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "gene")]
    pub gene_id: String,
    pub mutation: MutationScript,
}

impl BlockRecord {
    pub fn new(gene_id: impl Into<String>, mutation: MutationScript) -> Self {
        Self { gene_id: gene_id.into(), mutation }
    }

    /// A block that reconstructs to its gene verbatim.
    pub fn verbatim(gene_id: impl Into<String>) -> Self {
        Self::new(gene_id, MutationScript::noop())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub original_length: usize,
    pub block_size: usize,
    #[serde(default)]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
    /// Keys this version does not know about, kept for re-saving.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(original_length: usize, block_size: usize) -> Self {
        Self {
            original_length,
            block_size,
            format_version: crate::FORMAT_VERSION.into(),
            created_at: None,
            author: None,
            generator: None,
            generator_version: None,
            source_filename: None,
            extra: Map::new(),
        }
    }
}

/// Seed vs dynamic gene counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeneStats {
    pub seed: usize,
    pub dynamic: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub genes: GeneDictionary,
    pub blocks: Vec<BlockRecord>,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(genes: GeneDictionary, blocks: Vec<BlockRecord>, metadata: Metadata) -> Self {
        Self { genes, blocks, metadata }
    }

    /// Check that every block references a known gene.
    pub fn validate(&self) -> Result<()> {
        for (block, record) in self.blocks.iter().enumerate() {
            if !self.genes.contains(&record.gene_id) {
                return Err(GcError::DanglingGeneReference {
                    block,
                    gene: record.gene_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn gene_stats(&self) -> GeneStats {
        let dynamic = self.genes.ids().filter(|id| is_dynamic_gene(id)).count();
        GeneStats { seed: self.genes.len() - dynamic, dynamic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let genes: GeneDictionary = [("G0", "ACGTACGT"), ("G_dyn_1", "hello")].into_iter().collect();
        Document::new(
            genes,
            vec![BlockRecord::new("G0", MutationScript::parse("Mut_0_A")), BlockRecord::verbatim("G_dyn_1")],
            Metadata::new(13, 8),
        )
    }

    #[test]
    fn test_gene_order_preserved() {
        let mut genes = GeneDictionary::new();
        genes.insert("G_dyn_10", "b");
        genes.insert("G_dyn_5", "a");
        genes.insert("G0", "c");
        let ids: Vec<_> = genes.ids().collect();
        assert_eq!(ids, vec!["G_dyn_10", "G_dyn_5", "G0"]);

        let json = serde_json::to_string(&genes).unwrap();
        assert_eq!(json, r#"{"G_dyn_10":"b","G_dyn_5":"a","G0":"c"}"#);
        let back: GeneDictionary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ids().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut genes: GeneDictionary = [("G0", "A"), ("G1", "C")].into_iter().collect();
        assert_eq!(genes.insert("G0", "T"), Some("A".to_string()));
        assert_eq!(genes.iter().next(), Some(("G0", "T")));
        assert_eq!(genes.len(), 2);
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let result: std::result::Result<GeneDictionary, _> = serde_json::from_str(r#"{"G0":"A","G0":"C"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_dangling() {
        let mut doc = sample();
        assert!(doc.validate().is_ok());
        doc.blocks.push(BlockRecord::verbatim("G9"));
        match doc.validate() {
            Err(GcError::DanglingGeneReference { block, gene }) => {
                assert_eq!(block, 2);
                assert_eq!(gene, "G9");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_gene_stats() {
        assert_eq!(sample().gene_stats(), GeneStats { seed: 1, dynamic: 1 });
    }

    #[test]
    fn test_block_record_field_names() {
        let json = serde_json::to_value(BlockRecord::verbatim("G0")).unwrap();
        assert_eq!(json, serde_json::json!({"gene": "G0", "mutation": "-"}));
    }

    #[test]
    fn test_metadata_extra_roundtrip() {
        let json = serde_json::json!({
            "original_length": 4,
            "block_size": 2,
            "format_version": "1.0",
            "note": "kept"
        });
        let meta: Metadata = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(meta.extra.get("note"), Some(&Value::String("kept".into())));
        assert_eq!(serde_json::to_value(&meta).unwrap(), json);
    }
}
