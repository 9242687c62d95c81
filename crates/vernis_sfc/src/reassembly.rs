//! Reassembly entries and the per-run reassembly cache.
//!
//! An entry keeps the non-script parts of a composite document so a fixed
//! script can be put back between them before the document is persisted.

use crate::path::cache_key;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix and suffix surrounding the script block of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassemblyEntry {
    /// Normalized absolute document path
    pub path: PathBuf,
    /// Document content before the script content
    pub prefix: String,
    /// Document content from the end of the script content to the end
    pub suffix: String,
}

impl ReassemblyEntry {
    /// Rebuild the full document around a (possibly fixed) script.
    ///
    /// The script is trimmed and framed by single newlines.
    pub fn reassemble(&self, script: &str) -> String {
        let script = script.trim();
        let mut out = String::with_capacity(self.prefix.len() + script.len() + self.suffix.len() + 2);
        out.push_str(&self.prefix);
        out.push('\n');
        out.push_str(script);
        out.push('\n');
        out.push_str(&self.suffix);
        out
    }

    /// Offset of the script content inside a reassembled document.
    #[inline]
    pub fn reassembled_script_start(&self) -> usize {
        self.prefix.len() + 1
    }
}

/// Reassembly entries of one lint run, keyed by normalized path.
///
/// Written by the segment extractor, read by the write-back reassembler.
/// The first entry recorded for a path wins; entries are never replaced.
#[derive(Debug, Default)]
pub struct ReassemblyCache {
    entries: DashMap<PathBuf, Arc<ReassemblyEntry>>,
}

impl ReassemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the prefix/suffix of a document, keeping an existing entry.
    pub fn insert(&self, path: &Path, prefix: &str, suffix: &str) -> Arc<ReassemblyEntry> {
        let key = cache_key(path);
        let entry = self.entries.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(path = %key.display(), "cached reassembly entry");
            Arc::new(ReassemblyEntry {
                path: key,
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            })
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, path: &Path) -> Option<Arc<ReassemblyEntry>> {
        self.entries
            .get(&cache_key(path))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&cache_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ReassemblyEntry {
        ReassemblyEntry {
            path: PathBuf::from("/p/App.vue"),
            prefix: "<template><div/></template>\n<script lang=\"ts\">".to_string(),
            suffix: "</script>\n<style></style>\n".to_string(),
        }
    }

    #[test]
    fn test_reassemble_trims_and_frames_script() {
        let entry = entry();
        let doc = entry.reassemble("\n\n  const a = 1;\n\n");
        assert_eq!(
            doc,
            "<template><div/></template>\n<script lang=\"ts\">\nconst a = 1;\n</script>\n<style></style>\n"
        );
        assert_eq!(&doc[entry.reassembled_script_start()..][..12], "const a = 1;");
    }

    #[test]
    fn test_reassemble_empty_script() {
        let entry = entry();
        assert_eq!(
            entry.reassemble("   "),
            format!("{}\n\n{}", entry.prefix, entry.suffix)
        );
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = ReassemblyCache::new();
        cache.insert(Path::new("/p/App.vue"), "a", "b");
        cache.insert(Path::new("/p/./App.vue"), "c", "d");

        assert_eq!(cache.len(), 1);
        let entry = cache.get(Path::new("/p/q/../App.vue")).unwrap();
        assert_eq!(entry.prefix, "a");
        assert_eq!(entry.suffix, "b");
    }

    #[test]
    fn test_missing_entry() {
        let cache = ReassemblyCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(Path::new("/p/main.ts")).is_none());
        assert!(!cache.contains(Path::new("/p/main.ts")));
    }
}
