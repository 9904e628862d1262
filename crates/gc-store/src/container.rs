//! On-disk container: indented JSON with `genes`, `blocks` and `metadata`.

use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use gc_core::document::REQUIRED_KEYS;
use gc_core::{Document, GcError, ProvenanceConfig, Result, FORMAT_VERSION};

use crate::file_store;

const INDENT: &[u8] = b"   ";

/// Reads and writes container files, stamping provenance on save.
#[derive(Debug, Clone, Default)]
pub struct Container {
    provenance: ProvenanceConfig,
}

impl Container {
    pub fn new(provenance: ProvenanceConfig) -> Self {
        Self { provenance }
    }

    pub fn provenance(&self) -> &ProvenanceConfig {
        &self.provenance
    }

    /// Save a document. The caller's document is not modified.
    pub fn save(&self, document: &Document, path: impl AsRef<Path>) -> Result<()> {
        self.save_value(serde_json::to_value(document)?, path, None)
    }

    /// Save a document and record the file it was compressed from.
    pub fn save_with_source(
        &self,
        document: &Document,
        path: impl AsRef<Path>,
        source_filename: &str,
    ) -> Result<()> {
        self.save_value(serde_json::to_value(document)?, path, Some(source_filename))
    }

    /// Save an untyped container value after checking its required keys.
    pub fn save_value(
        &self,
        mut value: Value,
        path: impl AsRef<Path>,
        source_filename: Option<&str>,
    ) -> Result<()> {
        let path = path.as_ref();
        check_required_keys(&value)?;
        let metadata = value
            .get_mut("metadata")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| GcError::UnparsableContainer("metadata must be an object".into()))?;
        self.stamp(metadata, source_filename);

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        value.serialize(&mut ser)?;
        file_store::write_atomic(path, &buf)?;

        debug!(path = %path.display(), bytes = buf.len(), "container saved");
        Ok(())
    }

    /// Load and type-check a container.
    pub fn load(path: impl AsRef<Path>) -> Result<Document> {
        let value = Self::load_value(path)?;
        serde_json::from_value(value).map_err(|e| GcError::UnparsableContainer(e.to_string()))
    }

    /// Load a container as raw JSON; only the required keys are checked.
    pub fn load_value(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let raw = file_store::read(path)?;
        let value: Value =
            serde_json::from_slice(&raw).map_err(|e| GcError::UnparsableContainer(e.to_string()))?;
        check_required_keys(&value)?;
        debug!(path = %path.display(), bytes = raw.len(), "container loaded");
        Ok(value)
    }

    fn stamp(&self, metadata: &mut Map<String, Value>, source_filename: Option<&str>) {
        metadata.insert("format_version".into(), FORMAT_VERSION.into());
        metadata.insert("created_at".into(), Local::now().to_rfc3339().into());
        metadata.insert("author".into(), self.provenance.author.clone().into());
        metadata.insert("generator".into(), self.provenance.generator.clone().into());
        metadata.insert("generator_version".into(), self.provenance.generator_version.clone().into());
        if let Some(source) = source_filename.filter(|s| !s.is_empty()) {
            metadata.insert("source_filename".into(), source.into());
        }
    }
}

fn check_required_keys(value: &Value) -> Result<()> {
    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| value.get(**key).is_none())
        .map(|key| key.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GcError::InvalidContainerStructure { missing })
    }
}
