//! SFC block scanner.
//!
//! Byte-level scan of the top-level blocks of a document. Only block
//! boundaries and opening-tag attributes are located; block contents are
//! never parsed, so offsets map one-to-one onto the original source.

use crate::types::{BlockKind, BlockLocation, SfcBlock, SfcBlocks, SfcError};
use memchr::{memchr, memmem};
use rustc_hash::FxHashMap;

// Static closing tags for fast comparison (avoid format!)
const CLOSING_TEMPLATE: &[u8] = b"</template>";
const CLOSING_SCRIPT: &[u8] = b"</script>";
const CLOSING_STYLE: &[u8] = b"</style>";

const TAG_TEMPLATE: &[u8] = b"template";
const TAG_SCRIPT: &[u8] = b"script";
const TAG_STYLE: &[u8] = b"style";

/// A block located by the scanner, not yet classified.
struct RawBlock<'a> {
    tag: &'a str,
    attrs: FxHashMap<&'a str, &'a str>,
    content_start: usize,
    content_end: usize,
    /// Offset right after the closing tag
    end_pos: usize,
}

/// Scan a document into its top-level blocks.
pub fn parse_blocks(source: &str) -> Result<SfcBlocks<'_>, SfcError> {
    let bytes = source.as_bytes();
    let len = bytes.len();

    let mut blocks = SfcBlocks::default();
    let mut pos = 0;
    let mut line = 1;

    while pos < len {
        let Some(next_lt) = memchr(b'<', &bytes[pos..]) else {
            break;
        };
        line += count_newlines(&bytes[pos..pos + next_lt]);
        pos += next_lt;

        // Top-level comments may mention tags, skip them whole
        if bytes[pos..].starts_with(b"<!--") {
            let end = memmem::find(&bytes[pos + 4..], b"-->")
                .map(|i| pos + 4 + i + 3)
                .unwrap_or(len);
            line += count_newlines(&bytes[pos..end]);
            pos = end;
            continue;
        }

        let Some(raw) = scan_block(bytes, source, pos) else {
            pos += 1;
            continue;
        };

        let loc = BlockLocation {
            start: raw.content_start,
            end: raw.content_end,
            start_line: line,
        };
        let content = &source[raw.content_start..raw.content_end];
        let tag_bytes = raw.tag.as_bytes();

        if tag_name_eq(tag_bytes, TAG_TEMPLATE) {
            if blocks.template.is_some() {
                return Err(SfcError::DuplicateBlock {
                    tag: "template",
                    loc,
                });
            }
            blocks.template = Some(SfcBlock {
                kind: BlockKind::Template,
                tag: raw.tag,
                content,
                loc,
                attrs: raw.attrs,
            });
        } else if tag_name_eq(tag_bytes, TAG_SCRIPT) {
            let is_setup = raw.attrs.contains_key("setup");
            let (slot, kind, tag) = if is_setup {
                (&mut blocks.script_setup, BlockKind::ScriptSetup, "script setup")
            } else {
                (&mut blocks.script, BlockKind::Script, "script")
            };
            if slot.is_some() {
                return Err(SfcError::DuplicateBlock { tag, loc });
            }
            *slot = Some(SfcBlock {
                kind,
                tag: raw.tag,
                content,
                loc,
                attrs: raw.attrs,
            });
        } else {
            let kind = if tag_name_eq(tag_bytes, TAG_STYLE) {
                BlockKind::Style
            } else {
                BlockKind::Custom
            };
            let block = SfcBlock {
                kind,
                tag: raw.tag,
                content,
                loc,
                attrs: raw.attrs,
            };
            if kind == BlockKind::Style {
                blocks.styles.push(block);
            } else {
                blocks.custom_blocks.push(block);
            }
        }

        line += count_newlines(&bytes[pos..raw.end_pos]);
        pos = raw.end_pos;
    }

    Ok(blocks)
}

/// Scan one block starting at the `<` at `start`.
fn scan_block<'a>(bytes: &[u8], source: &'a str, start: usize) -> Option<RawBlock<'a>> {
    let len = bytes.len();

    let mut pos = start + 1;
    let tag_start = pos;
    while pos < len && is_tag_name_char(bytes[pos]) {
        pos += 1;
    }
    if pos == tag_start {
        return None;
    }
    let tag = &source[tag_start..pos];

    let mut attrs: FxHashMap<&'a str, &'a str> = FxHashMap::default();

    while pos < len && bytes[pos] != b'>' {
        while pos < len && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= len || bytes[pos] == b'>' {
            break;
        }
        if bytes[pos] == b'/' {
            if pos + 1 < len && bytes[pos + 1] == b'>' {
                break;
            }
            pos += 1;
            continue;
        }

        let attr_start = pos;
        while pos < len {
            let c = bytes[pos];
            if c == b'=' || c == b'>' || c == b'/' || is_whitespace(c) {
                break;
            }
            pos += 1;
        }
        if pos == attr_start {
            pos += 1;
            continue;
        }
        let attr_name = &source[attr_start..pos];

        while pos < len && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }

        let attr_value = if pos < len && bytes[pos] == b'=' {
            pos += 1;
            while pos < len && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
                pos += 1;
            }
            if pos < len && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                let value_end = memchr(quote, &bytes[pos..])
                    .map(|i| pos + i)
                    .unwrap_or(len);
                pos = (value_end + 1).min(len);
                &source[value_start..value_end]
            } else {
                let value_start = pos;
                while pos < len && !is_whitespace(bytes[pos]) && bytes[pos] != b'>' {
                    pos += 1;
                }
                &source[value_start..pos]
            }
        } else {
            // Boolean attribute
            ""
        };

        attrs.insert(attr_name, attr_value);
    }

    if pos >= len {
        return None;
    }

    // Self-closing tag: `<script src="x.ts" />`
    if bytes[pos] == b'/' {
        let end_pos = pos + 2;
        return Some(RawBlock {
            tag,
            attrs,
            content_start: end_pos,
            content_end: end_pos,
            end_pos,
        });
    }

    // Skip '>'
    pos += 1;
    let content_start = pos;

    if tag_name_eq(tag.as_bytes(), TAG_TEMPLATE) {
        return find_template_end(bytes, pos).map(|(content_end, end_pos)| RawBlock {
            tag,
            attrs,
            content_start,
            content_end,
            end_pos,
        });
    }

    let (content_end, end_pos) = if tag_name_eq(tag.as_bytes(), TAG_SCRIPT) {
        find_closing(bytes, pos, CLOSING_SCRIPT)?
    } else if tag_name_eq(tag.as_bytes(), TAG_STYLE) {
        find_closing(bytes, pos, CLOSING_STYLE)?
    } else {
        find_custom_block_end(bytes, pos, tag.as_bytes())?
    };

    Some(RawBlock {
        tag,
        attrs,
        content_start,
        content_end,
        end_pos,
    })
}

/// Find the `</template>` matching an already opened template, honouring
/// nested `<template>` elements.
fn find_template_end(bytes: &[u8], mut pos: usize) -> Option<(usize, usize)> {
    let len = bytes.len();
    let mut depth = 1;

    while pos < len {
        let lt = memchr(b'<', &bytes[pos..])?;
        pos += lt;

        if starts_with_ignore_case(&bytes[pos..], CLOSING_TEMPLATE) {
            depth -= 1;
            if depth == 0 {
                return Some((pos, pos + CLOSING_TEMPLATE.len()));
            }
            pos += CLOSING_TEMPLATE.len();
            continue;
        }

        if starts_with_ignore_case(&bytes[pos + 1..], TAG_TEMPLATE) {
            let after = pos + 1 + TAG_TEMPLATE.len();
            if after < len && (bytes[after] == b'>' || is_whitespace(bytes[after])) {
                let tag_end = memchr(b'>', &bytes[after..]).map(|i| after + i)?;
                if bytes[tag_end - 1] != b'/' {
                    depth += 1;
                }
                pos = tag_end + 1;
                continue;
            }
        }

        pos += 1;
    }

    None
}

/// Find a static closing tag (script/style bodies are raw text).
fn find_closing(bytes: &[u8], mut pos: usize, closing: &[u8]) -> Option<(usize, usize)> {
    while pos < bytes.len() {
        let lt = memchr(b'<', &bytes[pos..])?;
        pos += lt;
        if starts_with_ignore_case(&bytes[pos..], closing) {
            return Some((pos, pos + closing.len()));
        }
        pos += 1;
    }
    None
}

/// Find the end of a custom block (`</name>`).
fn find_custom_block_end(bytes: &[u8], mut pos: usize, tag: &[u8]) -> Option<(usize, usize)> {
    let len = bytes.len();

    while pos < len {
        let lt = memchr(b'<', &bytes[pos..])?;
        pos += lt;

        if pos + 2 < len && bytes[pos + 1] == b'/' {
            let name_start = pos + 2;
            let name_end = name_start + tag.len();
            if name_end < len
                && bytes[name_start..name_end].eq_ignore_ascii_case(tag)
                && bytes[name_end] == b'>'
            {
                return Some((pos, name_end + 1));
            }
        }
        pos += 1;
    }

    None
}

#[inline(always)]
fn count_newlines(bytes: &[u8]) -> usize {
    memchr::memchr_iter(b'\n', bytes).count()
}

#[inline(always)]
fn tag_name_eq(name: &[u8], expected: &[u8]) -> bool {
    name.len() == expected.len() && name.eq_ignore_ascii_case(expected)
}

#[inline(always)]
fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

#[inline(always)]
fn is_tag_name_char(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_')
}

#[inline(always)]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
