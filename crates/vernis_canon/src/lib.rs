//! # vernis_canon
//!
//! Program context for type-aware linting.
//!
//! Loads a project's tsconfig file set through a [`SourceHost`], serving Vue
//! components as their script segment via [`VirtualSourceHost`], and links
//! the parsed units through [`ModuleResolver`] so that lint rules can ask
//! which modules resolve and what they export.

mod error;
mod host;
mod program;
mod resolver;
mod scan;
mod tsconfig;

pub use error::{CanonError, CanonResult, HostError};
pub use host::{
    source_type_for, CompositeOrigin, OsSourceHost, SourceHost, SourceUnit, VirtualSourceHost,
};
pub use program::{Program, SemanticDiagnostic, SemanticDiagnosticKind};
pub use resolver::{
    AliasRule, ModuleResolutionHost, ModuleResolver, DEFAULT_ALIAS_DIR, DEFAULT_ALIAS_SYMBOL,
    RESOLVE_EXTENSIONS,
};
pub use scan::{
    scan_module, ImportedName, ModuleExports, ModuleRecord, ModuleRequest, RequestKind,
    SyntaxError,
};
pub use tsconfig::{has_source_extension, CompilerOptions, PathMapping, TsConfig, SOURCE_EXTENSIONS};
