//! # vernis
//!
//! Type-aware TypeScript linter and autofixer for Vue projects.
//!
//! This crate provides the `vernis` command line and re-exports the
//! sub-crates it is built from.
//!
//! ## Crates
//!
//! - [`sfc`] - Script segment extraction and reassembly of Vue components
//! - [`canon`] - Program context: tsconfig loading, module resolution
//! - [`patina`] - Lint rules, autofix, write-back and output formatters

pub mod commands;
pub mod config;
pub mod error;

/// Script segment extraction and reassembly of Vue components.
pub use vernis_sfc as sfc;

/// Program context: tsconfig loading, module resolution.
pub use vernis_canon as canon;

/// Lint rules, autofix, write-back and output formatters.
pub use vernis_patina as patina;
