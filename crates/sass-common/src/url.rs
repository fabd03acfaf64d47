//! Canonical URL handling for `@use`, `@import`, and `@forward` targets.
//!
//! Sass identifies a loaded stylesheet by its *canonical URL*: two loads that
//! resolve to the same canonical URL share one parse tree and module. This
//! module resolves relative import targets against the `url` crate's `Url`
//! type instead of hand-rolled string splicing, and adds the
//! filename-extension helpers the importer subsystem needs.
//!
//! Canonicalization here is *normalize-only*: `..` segments are collapsed
//! textually, but symlinks are never resolved. This mirrors one of the two
//! policies real-world filesystem importers have used historically; we pick
//! the simpler one and document the choice rather than special-casing
//! symlinks anywhere in the core (see the Open Questions in the design doc).

use url::Url;

/// Resolve `href` against `base`, the way `@use "href"` is resolved relative
/// to the stylesheet that contains it.
///
/// If `href` is already an absolute URL (has a scheme), it is returned as-is.
/// Otherwise it is joined against `base` per the URL Standard's relative
/// resolution algorithm (delegated to the `url` crate).
///
/// Returns `None` if `href` cannot be parsed as a relative reference against
/// `base` (e.g. `base` is a `cannot-be-a-base` URL).
#[must_use]
pub fn resolve(href: &str, base: &Url) -> Option<Url> {
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute);
    }
    base.join(href).ok()
}

/// Build a `file:` URL from a filesystem path, normalizing `.`/`..` segments
/// textually without touching the filesystem (no symlink resolution).
#[must_use]
pub fn file_url_from_path(path: &std::path::Path) -> Option<Url> {
    let normalized = normalize_path(path);
    Url::from_file_path(&normalized).ok()
}

/// Collapse `.` and `..` path components textually. Does not consult the
/// filesystem, so it does not resolve symlinks — see the module docs.
#[must_use]
pub fn normalize_path(path: &std::path::Path) -> std::path::PathBuf {
    use std::path::Component;

    let mut out = std::path::PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// The syntax a stylesheet should be parsed with, inferred from a canonical
/// URL's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSyntax {
    /// `.scss` — braces-and-semicolons syntax.
    Scss,
    /// `.sass` — indentation-based syntax.
    Indented,
    /// `.css` — plain CSS, loaded via `@import` only, never evaluated as Sass.
    Css,
}

/// Infer [`UrlSyntax`] from a canonical URL's extension, if recognized.
#[must_use]
pub fn syntax_for_url(url: &Url) -> Option<UrlSyntax> {
    let path = url.path();
    if path.ends_with(".scss") {
        Some(UrlSyntax::Scss)
    } else if path.ends_with(".sass") {
        Some(UrlSyntax::Indented)
    } else if path.ends_with(".css") {
        Some(UrlSyntax::Css)
    } else {
        None
    }
}

/// Whether the last path segment of `url` names a partial (starts with `_`).
///
/// A partial is a stylesheet whose filename starts with `_`; it is loaded
/// only as a dependency, never as a compilation entry point.
#[must_use]
pub fn is_partial(url: &Url) -> bool {
    basename(url).is_some_and(|name| name.starts_with('_'))
}

/// The final path segment of a URL, e.g. `"_foo.scss"` for `file:///a/_foo.scss`.
#[must_use]
pub fn basename(url: &Url) -> Option<&str> {
    url.path_segments()?.next_back().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_against_base() {
        let base = Url::parse("file:///proj/main.scss").unwrap();
        let resolved = resolve("_partial", &base).unwrap();
        assert_eq!(resolved.as_str(), "file:///proj/_partial");
    }

    #[test]
    fn resolve_absolute_ignores_base() {
        let base = Url::parse("file:///proj/main.scss").unwrap();
        let resolved = resolve("file:///other/thing.scss", &base).unwrap();
        assert_eq!(resolved.as_str(), "file:///other/thing.scss");
    }

    #[test]
    fn normalize_collapses_dotdot() {
        let path = std::path::Path::new("/a/b/../c/./d");
        assert_eq!(normalize_path(path), std::path::PathBuf::from("/a/c/d"));
    }

    #[test]
    fn syntax_detection() {
        let scss = Url::parse("file:///x/a.scss").unwrap();
        let sass = Url::parse("file:///x/a.sass").unwrap();
        let css = Url::parse("file:///x/a.css").unwrap();
        assert_eq!(syntax_for_url(&scss), Some(UrlSyntax::Scss));
        assert_eq!(syntax_for_url(&sass), Some(UrlSyntax::Indented));
        assert_eq!(syntax_for_url(&css), Some(UrlSyntax::Css));
    }

    #[test]
    fn partial_detection() {
        let partial = Url::parse("file:///x/_foo.scss").unwrap();
        let not_partial = Url::parse("file:///x/foo.scss").unwrap();
        assert!(is_partial(&partial));
        assert!(!is_partial(&not_partial));
    }
}
