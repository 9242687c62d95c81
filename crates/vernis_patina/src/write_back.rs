//! Writing fixed text back to disk.
//!
//! Fixes are computed against unit text. For a Vue component that text is
//! only the script segment, so [`WriteBackReassembler`] splices it back into
//! the component before the bytes reach the inner writer.

use std::cell::Cell;
use std::io;
use std::path::Path;
use vernis_sfc::ReassemblyCache;

/// Destination of fixed file contents.
pub trait FileWriter {
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes straight to the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileWriter;

impl FileWriter for OsFileWriter {
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// A [`FileWriter`] that reassembles composite documents while active.
///
/// Outside an [`Activation`] every write passes through unchanged, so the
/// wrapper is only in effect for the file currently being fixed.
pub struct WriteBackReassembler<'c, W> {
    inner: W,
    cache: &'c ReassemblyCache,
    active: Cell<bool>,
}

impl<'c, W: FileWriter> WriteBackReassembler<'c, W> {
    pub fn new(inner: W, cache: &'c ReassemblyCache) -> Self {
        Self {
            inner,
            cache,
            active: Cell::new(false),
        }
    }

    /// Enable reassembly until the returned guard is dropped.
    pub fn activate(&self) -> Activation<'_, 'c, W> {
        self.active.set(true);
        Activation { writer: self }
    }

    pub fn deactivate(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }
}

impl<W: FileWriter> FileWriter for WriteBackReassembler<'_, W> {
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.is_active() {
            if let Some(entry) = self.cache.get(path) {
                tracing::debug!(path = %path.display(), "reassembling composite document");
                return self.inner.write_file(path, &entry.reassemble(contents));
            }
        }
        self.inner.write_file(path, contents)
    }
}

/// Scope of an active [`WriteBackReassembler`]. Dropping it deactivates the
/// writer, on early return and unwind alike.
#[must_use = "the writer is deactivated when the guard is dropped"]
pub struct Activation<'w, 'c, W: FileWriter> {
    writer: &'w WriteBackReassembler<'c, W>,
}

impl<W: FileWriter> Drop for Activation<'_, '_, W> {
    fn drop(&mut self) {
        self.writer.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingWriter {
        writes: RefCell<Vec<(PathBuf, String)>>,
    }

    impl FileWriter for &RecordingWriter {
        fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
            self.writes
                .borrow_mut()
                .push((path.to_path_buf(), contents.to_string()));
            Ok(())
        }
    }

    fn cache_with_component() -> ReassemblyCache {
        let cache = ReassemblyCache::new();
        cache.insert(
            Path::new("/project/src/App.vue"),
            "<script lang=\"ts\">",
            "</script>\n",
        );
        cache
    }

    #[test]
    fn test_reassembles_while_active() {
        let cache = cache_with_component();
        let recorder = RecordingWriter::default();
        let writer = WriteBackReassembler::new(&recorder, &cache);

        {
            let _active = writer.activate();
            writer
                .write_file(Path::new("/project/src/App.vue"), "  const a = 1\n")
                .unwrap();
        }

        let writes = recorder.writes.borrow();
        assert_eq!(
            writes[0].1,
            "<script lang=\"ts\">\nconst a = 1\n</script>\n"
        );
        assert!(!writer.is_active());
    }

    #[test]
    fn test_passes_through_when_inactive_or_unknown() {
        let cache = cache_with_component();
        let recorder = RecordingWriter::default();
        let writer = WriteBackReassembler::new(&recorder, &cache);

        writer
            .write_file(Path::new("/project/src/App.vue"), "raw")
            .unwrap();
        {
            let _active = writer.activate();
            writer
                .write_file(Path::new("/project/src/main.ts"), "const b = 2\n")
                .unwrap();
        }

        writer
            .write_file(Path::new("/project/src/App.vue"), "after")
            .unwrap();

        let writes = recorder.writes.borrow();
        assert_eq!(writes[0].1, "raw");
        assert_eq!(writes[1].1, "const b = 2\n");
        assert_eq!(writes[2], (PathBuf::from("/project/src/App.vue"), "after".to_string()));
    }

    #[test]
    fn test_deactivates_on_unwind() {
        let cache = cache_with_component();
        let recorder = RecordingWriter::default();
        let writer = WriteBackReassembler::new(&recorder, &cache);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _active = writer.activate();
            assert!(writer.is_active());
            panic!("lint pass failed");
        }));
        assert!(result.is_err());
        assert!(!writer.is_active());
    }
}
