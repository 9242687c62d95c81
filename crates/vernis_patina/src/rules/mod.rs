//! Built-in lint rules.

mod no_consecutive_blank_lines;
mod no_unresolved_imports;
mod no_unused_imports;

pub use no_consecutive_blank_lines::NoConsecutiveBlankLines;
pub use no_unresolved_imports::NoUnresolvedImports;
pub use no_unused_imports::NoUnusedImports;
