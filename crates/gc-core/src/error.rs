use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcError {
    #[error("Input not found: {path}")]
    InputNotFound { path: String },
    #[error("Input is empty: {path}")]
    EmptyInput { path: String },
    #[error("Invalid container structure: missing {}", missing.join(", "))]
    InvalidContainerStructure { missing: Vec<String> },
    #[error("Unparsable container: {0}")]
    UnparsableContainer(String),
    #[error("Fixed-length scan requires min_len == max_len, got {min_len}..={max_len}")]
    IncompatibleScanConfiguration { min_len: usize, max_len: usize },
    #[error("Character {ch:?} at position {position} does not fit in a single byte")]
    SymbolEncodingPrecondition { ch: char, position: usize },
    #[error("Symbol decoding error: {0}")]
    SymbolDecoding(String),
    #[error("Block {block} references unknown gene {gene}")]
    DanglingGeneReference { block: usize, gene: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GcError>;
