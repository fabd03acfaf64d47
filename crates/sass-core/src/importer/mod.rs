//! Resolving `@use`/`@forward`/`@import` targets to loadable source text.
//!
//! The evaluator never touches a filesystem directly — every load goes
//! through the [`Importer`] trait, so an embedding host can substitute an
//! in-memory or network-backed importer without the core crate knowing
//! the difference. [`filesystem::FilesystemImporter`] is the default,
//! load-path-based implementation used by the CLI.

pub mod filesystem;

use std::sync::Arc;

use url::Url;

use crate::error::{SourceFile, SassResult};
use crate::parser::Syntax;

pub use filesystem::FilesystemImporter;

/// A source of stylesheets for `@use`, `@forward`, and `@import`.
pub trait Importer {
    /// Resolve `target` (the string written after `@use`/`@import`/
    /// `@forward`) against `from`, the canonical URL of the stylesheet
    /// that contains the load directive. Returns `None` if nothing
    /// matches.
    ///
    /// `from_import` is `true` only for the legacy `@import` rule, which
    /// additionally considers `X.import.{sass,scss}` / `_X.import.{sass,scss}`
    /// before the names `@use`/`@forward` would find (§4.5).
    fn canonicalize(&self, target: &str, from: &Url, from_import: bool) -> Option<Url>;

    /// Load the text at a canonical URL previously returned by
    /// [`canonicalize`](Importer::canonicalize), plus the syntax it
    /// should be parsed with.
    fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)>;
}
