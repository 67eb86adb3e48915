//! TOML file backed repository.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use fibermap_core::{
    identifier::Id,
    network::{CableSegment, DistributionBox, OriginPoint},
    repository::{OffsetExpression, OffsetTarget, Repository, RepositoryError},
};

use crate::{document::NetworkDocument, error::StoreError, memory::MemoryRepository};

/// A [`Repository`] backed by a TOML [`NetworkDocument`] on disk.
///
/// Reads and offset updates happen in memory. [`Repository::persist`] writes
/// the whole document to a temporary file next to the target and renames it
/// over the target, so a failed write leaves the previous file intact.
#[derive(Debug)]
pub struct FileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl FileRepository {
    /// Loads the network document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or a parse error
    /// for malformed documents.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading network document");

        let source = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = NetworkDocument::from_toml(&source)?;
        Ok(Self::from_document(path, document))
    }

    /// Wraps an already parsed document that persists to `path`.
    pub fn from_document(path: impl Into<PathBuf>, document: NetworkDocument) -> Self {
        debug!(
            origins = document.origins.len(),
            boxes = document.boxes.len(),
            segments = document.segments.len();
            "Network document parsed"
        );

        Self {
            path: path.into(),
            inner: MemoryRepository::from_document(document),
        }
    }

    /// Redirects subsequent [`Repository::persist`] calls to `path`.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read access to the in-memory state.
    pub fn memory(&self) -> &MemoryRepository {
        &self.inner
    }

    /// Fills missing segment extremities; see [`MemoryRepository::resolve_extremities`].
    pub fn resolve_extremities(&mut self) -> usize {
        self.inner.resolve_extremities()
    }

    fn write_document(&self) -> Result<(), RepositoryError> {
        let text = self
            .inner
            .to_document()
            .to_toml()
            .map_err(|err| RepositoryError::Write(err.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(text.as_bytes())?;
        staged.flush()?;
        staged
            .persist(&self.path)
            .map_err(|err| RepositoryError::Write(err.to_string()))?;
        Ok(())
    }
}

impl Repository for FileRepository {
    fn get_root_nodes(&self) -> Result<Vec<OriginPoint>, RepositoryError> {
        self.inner.get_root_nodes()
    }

    fn get_first_segments(
        &self,
        origin: Id,
        exclude_section: Option<Id>,
    ) -> Result<Vec<CableSegment>, RepositoryError> {
        self.inner.get_first_segments(origin, exclude_section)
    }

    fn get_boxes_on_section(&self, section: Id) -> Result<Vec<DistributionBox>, RepositoryError> {
        self.inner.get_boxes_on_section(section)
    }

    fn get_box(&self, code: Id) -> Result<Option<DistributionBox>, RepositoryError> {
        self.inner.get_box(code)
    }

    fn get_segment(&self, code: Id) -> Result<Option<CableSegment>, RepositoryError> {
        self.inner.get_segment(code)
    }

    fn get_next_segment(
        &self,
        section: Id,
        new_origin: Id,
    ) -> Result<Option<CableSegment>, RepositoryError> {
        self.inner.get_next_segment(section, new_origin)
    }

    fn update_offsets(
        &mut self,
        ids: &[Id],
        target: OffsetTarget,
        expression: OffsetExpression,
    ) -> Result<usize, RepositoryError> {
        self.inner.update_offsets(ids, target, expression)
    }

    fn persist(&mut self) -> Result<(), RepositoryError> {
        debug!(path = self.path.display().to_string(); "Persisting network document");
        self.write_document()?;
        self.inner.persist()
    }
}
