//! Source hosts: where the program gets its source units from.
//!
//! [`OsSourceHost`] reads plain files. [`VirtualSourceHost`] decorates any
//! host so composite documents come out as their script segment only, while
//! every other path is served by the inner host unchanged.

use crate::error::HostError;
use oxc_span::SourceType;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vernis_sfc::{cache_key, is_composite_path, ReassemblyCache, SegmentExtractor, SfcError};

/// Where a virtual unit came from inside its composite document.
#[derive(Debug, Clone)]
pub struct CompositeOrigin {
    /// Full text of the composite document
    pub document: Arc<str>,
    /// Offset of the script content in `document`
    pub offset: usize,
}

/// A unit of source handed to the parser.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Normalized absolute path
    pub path: PathBuf,
    /// Text that is parsed and analyzed
    pub text: Arc<str>,
    pub source_type: SourceType,
    /// Set for units virtualized from a composite document
    pub origin: Option<CompositeOrigin>,
}

impl SourceUnit {
    pub fn new(path: &Path, text: impl Into<Arc<str>>, source_type: SourceType) -> Self {
        Self {
            path: cache_key(path),
            text: text.into(),
            source_type,
            origin: None,
        }
    }

    /// Whether the unit is the script segment of a composite document.
    #[inline]
    pub fn is_composite(&self) -> bool {
        self.origin.is_some()
    }

    /// Offset of unit text inside the document diagnostics are reported against.
    #[inline]
    pub fn origin_offset(&self) -> usize {
        self.origin.as_ref().map_or(0, |origin| origin.offset)
    }

    /// Text of the document diagnostics are reported against.
    pub fn document_text(&self) -> &str {
        match &self.origin {
            Some(origin) => &origin.document,
            None => &self.text,
        }
    }
}

/// Source type for a standalone file, from its extension.
pub fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts())
}

/// Provides source units to the program.
pub trait SourceHost: Send + Sync {
    /// Load the unit at `path`; `Ok(None)` when the file does not exist.
    fn get_source(&self, path: &Path) -> Result<Option<SourceUnit>, HostError>;

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Reads source files from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSourceHost;

impl SourceHost for OsSourceHost {
    fn get_source(&self, path: &Path) -> Result<Option<SourceUnit>, HostError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(SourceUnit::new(path, text, source_type_for(path)))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HostError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Serves composite documents as their script segment.
///
/// The unit text is the segment content exactly; positions map back to the
/// document through [`CompositeOrigin`]. Extracting a segment records the
/// document's reassembly entry in the run's cache.
pub struct VirtualSourceHost<'c, H> {
    inner: H,
    cache: &'c ReassemblyCache,
}

impl<'c, H: SourceHost> VirtualSourceHost<'c, H> {
    pub fn new(inner: H, cache: &'c ReassemblyCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn virtualize(&self, unit: SourceUnit) -> Result<SourceUnit, HostError> {
        let extractor = SegmentExtractor::new(self.cache);
        let segment = match extractor.extract_from_str(&unit.path, &unit.text) {
            Ok(segment) => segment,
            Err(err @ SfcError::DuplicateBlock { .. }) => {
                tracing::warn!(path = %unit.path.display(), error = %err, "treating document as script-less");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let (text, offset, source_type) = match segment {
            Some(segment) => {
                let source_type = if segment.is_tsx() {
                    SourceType::tsx()
                } else {
                    SourceType::ts()
                };
                (segment.content, segment.start, source_type)
            }
            None => (String::new(), 0, SourceType::ts()),
        };

        Ok(SourceUnit {
            path: unit.path,
            text: text.into(),
            source_type,
            origin: Some(CompositeOrigin {
                document: unit.text,
                offset,
            }),
        })
    }
}

impl<H: SourceHost> SourceHost for VirtualSourceHost<'_, H> {
    fn get_source(&self, path: &Path) -> Result<Option<SourceUnit>, HostError> {
        let Some(unit) = self.inner.get_source(path)? else {
            return Ok(None);
        };
        if !is_composite_path(path) {
            return Ok(Some(unit));
        }
        self.virtualize(unit).map(Some)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.inner.file_exists(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.inner.directory_exists(path)
    }
}
