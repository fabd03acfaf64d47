//! Core Sass-to-CSS compilation: parser, evaluator, selector algebra, and
//! serializer for SCSS and the indented syntax.
//!
//! # Scope
//!
//! This crate implements the hard part of a Sass compiler:
//!
//! - **Parser** ([`parser`]) — two concrete-syntax entry points (braces-
//!   and-semicolons SCSS, indentation-based Sass) producing one AST
//!   ([`ast`]).
//! - **Value model** ([`value`]) — numbers with units, colors, strings,
//!   lists, maps, calculations, booleans, and null, with Sass's coercion
//!   and comparison rules.
//! - **Selector algebra** ([`selector`]) — parsing, nesting, unification,
//!   superselector testing, and `@extend` resolution.
//! - **Evaluator** ([`evaluator`]) — a tree-walking interpreter that
//!   resolves variables, mixins, functions, imports/modules, control flow,
//!   and parent-selector nesting, producing a CSS tree ([`css`]).
//! - **Importer & module cache** ([`importer`]) — URL canonicalization,
//!   partials/index lookup, and the default filesystem-backed importer.
//! - **Serializer** ([`serializer`]) — `expanded`/`compressed` output plus
//!   source maps.
//! - **Diagnostics** ([`diagnostics`], [`error`]) — error kinds, span
//!   highlighting, and the warn/debug logger with deprecation handling.
//!
//! Out of scope (left to a host, per the specification's §1): CLI argument
//! parsing and watch mode, the foreign-language embedding layer, terminal
//! color/TTY detection, and `pkg:` package-manifest resolution.
//!
//! # Entry point
//!
//! [`compile_string`] and [`compile_path`] tie every stage together: parse,
//! evaluate, apply `@extend`, serialize. A host that only wants a single
//! stage — say, just the selector algebra, for an `is-superselector`-style
//! tool — can use the submodules directly.

pub mod ast;
pub mod css;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod importer;
pub mod lexer;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod value;

use std::path::Path;
use std::sync::Arc;

use url::Url;

use diagnostics::{DeprecationAwareLogger, DeprecationPolicy, Logger, NullLogger, StderrLogger};
use error::{SassError, SassResult, SourceFile};
use evaluator::Evaluator;
use importer::{FilesystemImporter, Importer};
use parser::parse_stylesheet;
use selector::extend::apply_to_tree;
use serializer::{apply_charset, serialize, OutputStyle};

/// Which concrete syntax to parse an input as (§6 "Source syntaxes").
/// Re-exported at the crate root as a convenience.
pub use parser::Syntax;

/// Compile-time configuration, one field per §6's enumerated option table.
pub struct CompileOptions {
    /// `expanded` or `compressed` output (§4.6).
    pub style: OutputStyle,
    /// Additional filesystem roots searched by the default importer, in
    /// order, after the loading stylesheet's own directory.
    pub load_paths: Vec<std::path::PathBuf>,
    /// Additional importers, tried in order after the default filesystem
    /// importer. A host that wants to *replace* filesystem loading
    /// entirely should pass an empty `load_paths` and put its own importer
    /// first here.
    pub importers: Vec<Box<dyn Importer>>,
    /// Additional user-defined callables (§6 "User function interface"),
    /// reachable from Sass as plain global function calls. A signature
    /// that collides with a built-in name shadows the built-in; one that
    /// collides with another entry here is an error at compile start.
    pub functions: Vec<evaluator::UserFunction>,
    /// Whether to build a source map alongside the CSS text.
    pub source_map: bool,
    /// Whether the source map should inline full source contents.
    pub source_map_embed_sources: bool,
    /// Whether to inline the source map as a `data:` URL appended to the
    /// CSS, rather than returning it separately.
    pub source_map_embed: bool,
    /// Suppress `@warn` and `@debug` output entirely.
    pub quiet: bool,
    /// Suppress warnings and `sass:import` deprecation notices originating
    /// in stylesheets loaded as dependencies (through a load path or
    /// another configured importer) rather than relative to the
    /// entrypoint.
    pub quiet_deps: bool,
    /// Deprecation handling policy (fatal / silenced / verbose, §4.7).
    pub deprecations: DeprecationPolicy,
    /// Whether to emit `@charset "UTF-8";` / a UTF-8 BOM when the output
    /// contains non-ASCII text (§4.6). Defaults to `true`.
    pub charset: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            style: OutputStyle::Expanded,
            load_paths: Vec::new(),
            importers: Vec::new(),
            functions: Vec::new(),
            quiet_deps: false,
            source_map: false,
            source_map_embed_sources: false,
            source_map_embed: false,
            quiet: false,
            deprecations: DeprecationPolicy::default(),
            charset: true,
        }
    }
}

impl CompileOptions {
    /// Set the output style.
    #[must_use]
    pub fn with_style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Append one load path, tried after the stylesheet's own directory.
    #[must_use]
    pub fn with_load_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }

    /// Append one importer, tried after every importer already configured.
    #[must_use]
    pub fn with_importer(mut self, importer: Box<dyn Importer>) -> Self {
        self.importers.push(importer);
        self
    }

    /// Register one host-provided function, reachable from Sass as a
    /// plain global call.
    #[must_use]
    pub fn with_function(mut self, function: evaluator::UserFunction) -> Self {
        self.functions.push(function);
        self
    }

    /// Request a source map (§4.6).
    #[must_use]
    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }
}

/// The result of a successful compile: CSS text plus, if requested, its
/// source map JSON (§4.6).
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// The generated CSS, UTF-8 encoded.
    pub css: String,
    /// Version-3 source map JSON, present iff `source_map` was requested
    /// and `source_map_embed` was not — in which case the map is instead
    /// appended to `css` as a `data:` URL comment.
    pub source_map: Option<String>,
}

/// A list of importers tried in order: every explicitly configured
/// importer, then the default filesystem importer last, mirroring §4.5
/// ("the core maintains an ordered list of importers").
struct ImporterChain<'a> {
    configured: &'a [Box<dyn Importer>],
    filesystem: FilesystemImporter,
}

impl Importer for ImporterChain<'_> {
    fn canonicalize(&self, target: &str, from: &Url, from_import: bool) -> Option<Url> {
        self.configured
            .iter()
            .find_map(|importer| importer.canonicalize(target, from, from_import))
            .or_else(|| self.filesystem.canonicalize(target, from, from_import))
    }

    fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)> {
        for importer in self.configured {
            if let Ok(result) = importer.load(canonical) {
                return Ok(result);
            }
        }
        self.filesystem.load(canonical)
    }
}

/// Compile a Sass source string held in memory, under a synthetic or
/// caller-provided `url` used for span attribution and relative
/// `@use`/`@import` resolution.
pub fn compile_string(source: &str, url: Url, syntax: Syntax, options: &CompileOptions) -> SassResult<CompileResult> {
    let source_file = Arc::new(SourceFile::new(url.clone(), source.to_string()));
    let stylesheet = parse_stylesheet(&source_file, syntax)?;

    let null_logger = NullLogger;
    let stderr_logger = StderrLogger;
    let base_logger: &dyn Logger = if options.quiet { &null_logger } else { &stderr_logger };
    let logger = DeprecationAwareLogger::new(base_logger, options.deprecations.clone());

    let importer = ImporterChain {
        configured: &options.importers,
        filesystem: FilesystemImporter::new(options.load_paths.clone()),
    };

    let host_functions = evaluator::compile_host_functions(&options.functions)?;
    let evaluator = Evaluator::with_host_functions(&importer, &logger, host_functions).quiet_deps(options.quiet_deps);
    let (mut nodes, extend_engine) = evaluator.run(&stylesheet, url)?;
    apply_to_tree(&mut nodes, &extend_engine)?;

    let (css_body, map) = serialize(&nodes, options.style, options.source_map, options.source_map_embed_sources);
    let css = apply_charset(css_body, options.style, options.charset);

    let (css, source_map) = match (options.source_map, &map) {
        (true, Some(builder)) => {
            let json = builder.to_json(source_file.url.as_str());
            if options.source_map_embed {
                (format!("{css}\n{}", embed_comment(&json, options.style)), None)
            } else {
                (css, Some(json))
            }
        }
        _ => (css, None),
    };

    Ok(CompileResult { css, source_map })
}

/// Compile a Sass file from disk. The file's own directory is searched
/// first for relative loads, then `options.load_paths`, then
/// `options.importers`.
pub fn compile_path(path: &Path, options: &CompileOptions) -> SassResult<CompileResult> {
    let text = std::fs::read_to_string(path).map_err(|source| SassError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let url = sass_common::url::file_url_from_path(path).ok_or_else(|| SassError::Io {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a valid file path"),
    })?;
    let syntax = match path.extension().and_then(|e| e.to_str()) {
        Some("sass") => Syntax::Indented,
        _ => Syntax::Scss,
    };
    compile_string(&text, url, syntax, options)
}

fn embed_comment(json: &str, _style: OutputStyle) -> String {
    let data_url = serializer::source_map::SourceMapBuilder::embed_as_data_url(json);
    format!("/*# sourceMappingURL={data_url} */")
}
