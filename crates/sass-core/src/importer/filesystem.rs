//! The default, load-path-based [`Importer`](super::Importer): resolves
//! `@use`/`@import`/`@forward` targets against a stylesheet's own
//! directory and a configured list of additional load paths, following
//! the partial/index/extension search order real Sass tooling uses.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::error::{SassError, SassResult, SourceFile};
use crate::parser::Syntax;
use sass_common::url::{file_url_from_path, resolve, syntax_for_url, UrlSyntax};

use super::Importer;

/// Resolves `@use`/`@import` targets relative to the importing file's own
/// directory, then each configured load path in order.
pub struct FilesystemImporter {
    load_paths: Vec<PathBuf>,
}

impl FilesystemImporter {
    #[must_use]
    pub fn new(load_paths: Vec<PathBuf>) -> Self {
        Self { load_paths }
    }

    /// Every candidate file a bare `target` (no extension) could resolve
    /// to, in Sass's precedence order: the exact name, then the
    /// underscore-prefixed partial, for each recognized extension, then
    /// the two index-file spellings.
    fn candidates(dir: &Path, stem: &str, from_import: bool) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if from_import {
            for ext in ["scss", "sass"] {
                out.push(dir.join(format!("{stem}.import.{ext}")));
                out.push(dir.join(format!("_{stem}.import.{ext}")));
            }
        }
        for ext in ["scss", "sass", "css"] {
            out.push(dir.join(format!("{stem}.{ext}")));
            out.push(dir.join(format!("_{stem}.{ext}")));
        }
        for ext in ["scss", "sass", "css"] {
            out.push(dir.join(stem).join(format!("_index.{ext}")));
            out.push(dir.join(stem).join(format!("index.{ext}")));
        }
        out
    }

    fn resolve_in_dir(dir: &Path, target: &str, from_import: bool) -> Option<PathBuf> {
        let target_path = Path::new(target);
        if target_path.extension().is_some() {
            let direct = dir.join(target_path);
            if direct.is_file() {
                return Some(direct);
            }
            // A partial may still be referenced without its leading
            // underscore, e.g. `@use "foo.scss"` loading `_foo.scss`.
            let file_name = target_path.file_name()?.to_str()?;
            let partial = dir.join(target_path).with_file_name(format!("_{file_name}"));
            return partial.is_file().then_some(partial);
        }
        let (dir, stem) = match target_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => (dir.to_path_buf(), target.to_string()),
            Some(parent) => (
                dir.join(parent),
                target_path.file_name()?.to_str()?.to_string(),
            ),
            None => (dir.to_path_buf(), target.to_string()),
        };
        Self::candidates(&dir, &stem, from_import).into_iter().find(|p| p.is_file())
    }
}

impl Importer for FilesystemImporter {
    fn canonicalize(&self, target: &str, from: &Url, from_import: bool) -> Option<Url> {
        if let Some(resolved) = resolve(target, from) {
            if resolved.scheme() == "file" {
                if let Ok(path) = resolved.to_file_path() {
                    if path.is_file() {
                        return file_url_from_path(&path);
                    }
                }
            }
        }
        let from_dir = from.to_file_path().ok().and_then(|p| p.parent().map(Path::to_path_buf));
        let mut dirs: Vec<PathBuf> = from_dir.into_iter().collect();
        dirs.extend(self.load_paths.iter().cloned());
        for dir in dirs {
            if let Some(found) = Self::resolve_in_dir(&dir, target, from_import) {
                return file_url_from_path(&found);
            }
        }
        None
    }

    fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)> {
        let path = canonical
            .to_file_path()
            .map_err(|()| SassError::import(format!("not a file URL: {canonical}"), dummy_span(canonical)))?;
        let text = std::fs::read_to_string(&path).map_err(|source| SassError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let syntax = match syntax_for_url(canonical) {
            Some(UrlSyntax::Indented) => Syntax::Indented,
            Some(UrlSyntax::Scss | UrlSyntax::Css) | None => Syntax::Scss,
        };
        let source = Arc::new(SourceFile::new(canonical.clone(), text));
        Ok((source, syntax))
    }
}

fn dummy_span(url: &Url) -> crate::error::Span {
    let source = Arc::new(SourceFile::new(url.clone(), ""));
    crate::error::Span::new(source, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_partial_without_leading_underscore() {
        let dir = std::env::temp_dir().join("sass_core_importer_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("_foo.scss"), "").unwrap();
        let importer = FilesystemImporter::new(vec![]);
        let base = file_url_from_path(&dir.join("main.scss")).unwrap();
        let resolved = importer.canonicalize("foo", &base, false);
        assert!(resolved.is_some());
        assert!(resolved.unwrap().as_str().ends_with("_foo.scss"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn legacy_import_prefers_the_dot_import_variant() {
        let dir = std::env::temp_dir().join("sass_core_importer_import_variant_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("foo.scss"), "").unwrap();
        std::fs::write(dir.join("foo.import.scss"), "").unwrap();
        let importer = FilesystemImporter::new(vec![]);
        let base = file_url_from_path(&dir.join("main.scss")).unwrap();

        let via_use = importer.canonicalize("foo", &base, false).unwrap();
        assert!(via_use.as_str().ends_with("/foo.scss"));

        let via_import = importer.canonicalize("foo", &base, true).unwrap();
        assert!(via_import.as_str().ends_with("/foo.import.scss"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
