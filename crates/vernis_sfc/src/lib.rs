//! # vernis_sfc
//!
//! Script block extraction and reassembly for Vue single file components.
//!
//! A composite document (`*.vue`) embeds one TypeScript region inside
//! markup. This crate finds that region, hands its exact content and offsets
//! to the analysis side, and keeps the surrounding text so that a fixed
//! script can be written back without touching anything else.
//!
//! ## Usage
//!
//! ```rust
//! use std::path::Path;
//! use vernis_sfc::{ReassemblyCache, SegmentExtractor};
//!
//! let cache = ReassemblyCache::new();
//! let source = "<template><p/></template>\n<script lang=\"ts\">\nlet a = 1\n</script>\n";
//! let segment = SegmentExtractor::new(&cache)
//!     .extract_from_str(Path::new("/app/App.vue"), source)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(segment.content, "\nlet a = 1\n");
//!
//! let entry = cache.get(Path::new("/app/App.vue")).unwrap();
//! assert_eq!(
//!     entry.reassemble("let a = 2;"),
//!     "<template><p/></template>\n<script lang=\"ts\">\nlet a = 2;\n</script>\n"
//! );
//! ```

mod extract;
mod parse;
pub mod path;
mod reassembly;
mod types;

pub use extract::{is_supported_lang, ScriptSegment, SegmentExtractor, SUPPORTED_LANGS};
pub use parse::parse_blocks;
pub use path::{cache_key, is_composite_path, normalize_path};
pub use reassembly::{ReassemblyCache, ReassemblyEntry};
pub use types::{BlockKind, BlockLocation, SfcBlock, SfcBlocks, SfcError};
