//! SFC block type definitions.
//!
//! Zero-copy design: every block borrows its content and attributes from the
//! document source.

use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Kind of a top-level SFC block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Template,
    Script,
    ScriptSetup,
    Style,
    Custom,
}

/// Byte range of a block's content (delimiters excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockLocation {
    /// Offset of the first content byte, right after the opening tag's `>`
    pub start: usize,
    /// Offset of the `<` of the closing tag
    pub end: usize,
    /// 1-based line of the opening tag
    pub start_line: usize,
}

/// A top-level block of a single file component.
#[derive(Debug, Clone)]
pub struct SfcBlock<'a> {
    /// Block kind
    pub kind: BlockKind,
    /// Tag name as written in the source
    pub tag: &'a str,
    /// Raw block content
    pub content: &'a str,
    /// Content location in the document
    pub loc: BlockLocation,
    /// Attributes of the opening tag (boolean attributes map to "")
    pub attrs: FxHashMap<&'a str, &'a str>,
}

impl<'a> SfcBlock<'a> {
    /// Value of the `lang` attribute, if any.
    #[inline]
    pub fn lang(&self) -> Option<&'a str> {
        self.attrs.get("lang").copied()
    }

    /// Value of the `src` attribute, if any.
    #[inline]
    pub fn src(&self) -> Option<&'a str> {
        self.attrs.get("src").copied()
    }
}

/// All top-level blocks found in a document.
#[derive(Debug, Clone, Default)]
pub struct SfcBlocks<'a> {
    pub template: Option<SfcBlock<'a>>,
    pub script: Option<SfcBlock<'a>>,
    pub script_setup: Option<SfcBlock<'a>>,
    pub styles: Vec<SfcBlock<'a>>,
    pub custom_blocks: Vec<SfcBlock<'a>>,
}

/// Errors produced while reading or scanning a document.
#[derive(Debug, thiserror::Error)]
pub enum SfcError {
    /// The same block kind appears twice where only one is allowed.
    #[error("SFC can only contain one <{tag}> block (line {})", .loc.start_line)]
    DuplicateBlock {
        tag: &'static str,
        loc: BlockLocation,
    },

    /// The document could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
