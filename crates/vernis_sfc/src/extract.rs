//! Script segment extraction.

use crate::parse::parse_blocks;
use crate::reassembly::ReassemblyCache;
use crate::types::SfcError;
use std::path::Path;

/// Script languages that can be analyzed as standalone TypeScript.
pub const SUPPORTED_LANGS: &[&str] = &["ts", "tsx"];

/// The analyzable script region of a composite document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSegment {
    /// Value of the `lang` attribute
    pub lang: Option<String>,
    /// Exact script content, delimiters excluded
    pub content: String,
    /// Offset of the first content byte in the document
    pub start: usize,
    /// Offset one past the last content byte
    pub end: usize,
}

impl ScriptSegment {
    /// Whether the script is TSX rather than plain TypeScript.
    #[inline]
    pub fn is_tsx(&self) -> bool {
        self.lang.as_deref() == Some("tsx")
    }
}

/// Whether a `lang` attribute value names an analyzable script.
#[inline]
pub fn is_supported_lang(lang: Option<&str>) -> bool {
    lang.is_some_and(|lang| SUPPORTED_LANGS.contains(&lang))
}

/// Extracts the script segment of composite documents and records their
/// reassembly entries in the run's cache.
#[derive(Debug, Clone, Copy)]
pub struct SegmentExtractor<'c> {
    cache: &'c ReassemblyCache,
}

impl<'c> SegmentExtractor<'c> {
    pub fn new(cache: &'c ReassemblyCache) -> Self {
        Self { cache }
    }

    /// Read a document from disk and extract its script segment.
    pub fn extract(&self, path: &Path) -> Result<Option<ScriptSegment>, SfcError> {
        let source = std::fs::read_to_string(path).map_err(|source| SfcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_from_str(path, &source)
    }

    /// Extract the script segment of already-read document content.
    ///
    /// Returns `None` when the document has no script block or the block's
    /// language is not supported; nothing is cached in that case.
    pub fn extract_from_str(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Option<ScriptSegment>, SfcError> {
        let blocks = parse_blocks(source)?;

        let Some(script) = blocks.script.or(blocks.script_setup) else {
            tracing::debug!(path = %path.display(), "no script block, skipping");
            return Ok(None);
        };

        if !is_supported_lang(script.lang()) {
            tracing::debug!(
                path = %path.display(),
                lang = script.lang().unwrap_or(""),
                "unsupported script language, skipping"
            );
            return Ok(None);
        }

        let (start, end) = (script.loc.start, script.loc.end);
        self.cache.insert(path, &source[..start], &source[end..]);

        Ok(Some(ScriptSegment {
            lang: script.lang().map(str::to_string),
            content: script.content.to_string(),
            start,
            end,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = r#"<template>
  <div>{{ msg }}</div>
</template>

<script lang="ts">
import { ref } from 'vue'
export default { setup: () => ({ msg: ref('hi') }) }
</script>

<style scoped>
div { color: red; }
</style>
"#;

    #[test]
    fn test_extract_segment_and_cache_entry() {
        let cache = ReassemblyCache::new();
        let extractor = SegmentExtractor::new(&cache);
        let path = Path::new("/project/src/App.vue");

        let segment = extractor.extract_from_str(path, APP).unwrap().unwrap();
        assert_eq!(segment.lang.as_deref(), Some("ts"));
        assert_eq!(&APP[segment.start..segment.end], segment.content);
        assert!(segment.content.starts_with("\nimport { ref }"));

        let entry = cache.get(path).unwrap();
        assert_eq!(entry.prefix, &APP[..segment.start]);
        assert_eq!(entry.suffix, &APP[segment.end..]);
        assert_eq!(
            format!("{}{}{}", entry.prefix, segment.content, entry.suffix),
            APP
        );
    }

    #[test]
    fn test_reassembled_document_extracts_identically() {
        let path = Path::new("/project/src/App.vue");
        let cache = ReassemblyCache::new();
        let segment = SegmentExtractor::new(&cache)
            .extract_from_str(path, APP)
            .unwrap()
            .unwrap();
        let entry = cache.get(path).unwrap();

        let reassembled = entry.reassemble(&segment.content);
        assert_eq!(reassembled, APP);

        let fresh = ReassemblyCache::new();
        let again = SegmentExtractor::new(&fresh)
            .extract_from_str(path, &reassembled)
            .unwrap()
            .unwrap();
        let again_entry = fresh.get(path).unwrap();
        assert_eq!(again_entry.prefix, entry.prefix);
        assert_eq!(again_entry.suffix, entry.suffix);
        assert_eq!(again.content, segment.content);
    }

    #[test]
    fn test_no_script_block() {
        let cache = ReassemblyCache::new();
        let extractor = SegmentExtractor::new(&cache);
        let path = Path::new("/project/src/Static.vue");

        let segment = extractor
            .extract_from_str(path, "<template><p>static</p></template>\n")
            .unwrap();
        assert!(segment.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unsupported_lang_is_skipped() {
        let cache = ReassemblyCache::new();
        let extractor = SegmentExtractor::new(&cache);
        let path = Path::new("/project/src/Plain.vue");

        for source in [
            "<script>export default {}</script>",
            "<script lang=\"js\">export default {}</script>",
            "<script lang=\"coffee\">x = 1</script>",
        ] {
            assert!(extractor.extract_from_str(path, source).unwrap().is_none());
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_script_setup_fallback() {
        let cache = ReassemblyCache::new();
        let extractor = SegmentExtractor::new(&cache);
        let source = "<script setup lang=\"tsx\">const a = <div />\n</script>";

        let segment = extractor
            .extract_from_str(Path::new("/project/Setup.vue"), source)
            .unwrap()
            .unwrap();
        assert!(segment.is_tsx());
        assert_eq!(segment.content, "const a = <div />\n");
    }

    #[test]
    fn test_extract_reads_document_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.vue");
        std::fs::write(&path, APP).unwrap();

        let cache = ReassemblyCache::new();
        let segment = SegmentExtractor::new(&cache).extract(&path).unwrap();
        assert!(segment.is_some());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), APP);
        assert!(cache.contains(&path));
    }

    #[test]
    fn test_extract_missing_file() {
        let cache = ReassemblyCache::new();
        let err = SegmentExtractor::new(&cache)
            .extract(Path::new("/definitely/not/here.vue"))
            .unwrap_err();
        assert!(matches!(err, SfcError::Io { .. }));
    }
}
