//! Fix application.

use crate::diagnostic::{Fix, LintDiagnostic, TextEdit};

/// Most lint-and-fix rounds run on one unit before giving up.
pub const MAX_FIX_PASSES: usize = 10;

/// Apply the fixes carried by `diagnostics` to `source`.
///
/// Fixes are taken in source order; a fix overlapping one already taken is
/// left for the next round. Returns the new text and the number of fixes
/// applied.
pub fn apply_fixes(source: &str, diagnostics: &[LintDiagnostic]) -> (String, usize) {
    let mut fixes: Vec<&Fix> = diagnostics
        .iter()
        .filter_map(|d| d.fix.as_ref())
        .filter(|fix| !fix.edits.is_empty())
        .collect();
    fixes.sort_by_key(|fix| fix.range());

    let mut accepted: Vec<&TextEdit> = Vec::new();
    let mut last_end: Option<u32> = None;
    let mut applied = 0;

    for fix in fixes {
        let (start, end) = fix.range();
        if last_end.is_some_and(|last| start < last) {
            continue;
        }
        let in_bounds = fix.edits.iter().all(|edit| {
            edit.start <= edit.end
                && source.is_char_boundary(edit.start as usize)
                && source.is_char_boundary(edit.end as usize)
        });
        if !in_bounds {
            tracing::debug!(fix = %fix.message, "dropping fix with invalid range");
            continue;
        }
        accepted.extend(&fix.edits);
        last_end = Some(end);
        applied += 1;
    }

    accepted.sort_by(|a, b| b.start.cmp(&a.start));
    let mut output = source.to_string();
    for edit in accepted {
        output.replace_range(edit.start as usize..edit.end as usize, &edit.new_text);
    }
    (output, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use oxc_span::Span;

    fn fixable(start: u32, end: u32, text: &str) -> LintDiagnostic {
        LintDiagnostic::new("test", Severity::Error, "msg", Span::new(start, end))
            .with_fix(Fix::new("fix", TextEdit::replace(start, end, text)))
    }

    #[test]
    fn test_apply_non_overlapping() {
        let diagnostics = vec![fixable(8, 11, "C"), fixable(0, 3, "A"), fixable(4, 7, "B")];
        let (fixed, applied) = apply_fixes("aaa bbb ccc", &diagnostics);
        assert_eq!(fixed, "A B C");
        assert_eq!(applied, 3);
    }

    #[test]
    fn test_overlapping_fix_is_deferred() {
        let diagnostics = vec![fixable(0, 5, "x"), fixable(2, 7, "y")];
        let (fixed, applied) = apply_fixes("0123456789", &diagnostics);
        assert_eq!(fixed, "x56789");
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_out_of_bounds_fix_is_dropped() {
        let diagnostics = vec![fixable(3, 40, "")];
        let (fixed, applied) = apply_fixes("abc", &diagnostics);
        assert_eq!(fixed, "abc");
        assert_eq!(applied, 0);
    }
}
