//! Shared infrastructure used by the Sass compiler crates.
//!
//! This crate provides:
//! - **URL utilities** - canonicalization and joining for `@use`/`@import`/`@forward` targets
//! - **Repetition limiter** - deduplicates repeated diagnostics (e.g. deprecation warnings)

pub mod limiter;
pub mod url;
