//! Topology repositories for fibermap.
//!
//! Two [`Repository`](fibermap_core::repository::Repository) implementations
//! are provided:
//!
//! - [`MemoryRepository`]: ordered in-memory collections queried through a
//!   closed set of typed [`Filter`]s.
//! - [`FileRepository`]: a [`MemoryRepository`] loaded from, and persisted
//!   back to, a TOML [`NetworkDocument`].

pub mod document;
pub mod error;
pub mod filter;

mod file;
mod memory;

pub use document::NetworkDocument;
pub use error::StoreError;
pub use file::FileRepository;
pub use filter::{Field, Filter};
pub use memory::MemoryRepository;
