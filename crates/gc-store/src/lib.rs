//! Container persistence for compressed documents.

pub mod container;
pub mod file_store;

pub use container::Container;
