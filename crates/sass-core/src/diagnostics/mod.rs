//! Warnings, debug output, and error rendering (§4.7).
//!
//! The [`Logger`] trait is the seam between the evaluator and whatever a
//! host wants to do with `@warn`/`@debug` output. `sass-core` only ships
//! plain-text loggers; a host that wants colored terminal output (like
//! `sass-cli`, with `owo-colors`) wraps one of these rather than the core
//! reaching for a TTY-detection crate itself.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use strum_macros::{EnumString, IntoStaticStr};

use sass_common::limiter::{Admission, RepetitionLimiter};

use crate::error::{SassError, SassResult, Span, StackFrame};

mod render;

pub use render::render;

/// A named category of deprecated behavior a stylesheet can trigger,
/// mirroring the "deprecation id" concept real Sass implementations use
/// to let callers silence, opt into early, or escalate specific warnings.
/// The id strings (`as_ref`/`FromStr`, both kebab-case) are what
/// `--fatal-deprecation`-style host configuration compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Deprecation {
    /// Use of the legacy `@import` rule in favor of `@use`/`@forward`.
    Import,
    /// Calling a module function through its legacy unprefixed global name.
    GlobalBuiltin,
    /// `/` used for division outside a calculation context.
    SlashDiv,
}

impl Deprecation {
    #[must_use]
    pub fn id(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Receives `@warn`/`@debug` output and deprecation notices from the
/// evaluator. Implementations decide how (or whether) to surface them.
pub trait Logger {
    /// An `@warn` or internal runtime warning.
    fn warn(&self, message: &str, span: Option<&Span>, trace: &[StackFrame]);

    /// An `@debug` statement.
    fn debug(&self, message: &str, span: &Span);

    /// A warning tied to a specific [`Deprecation`] id. The default
    /// implementation just formats it through [`Logger::warn`]; a logger
    /// that wants repetition limiting, silencing, or fatal escalation
    /// (§4.7, §6) overrides this instead.
    fn warn_deprecated(&self, deprecation: Deprecation, message: &str, span: &Span) -> SassResult<()> {
        self.warn(&format!("Deprecation [{deprecation}]: {message}"), Some(span), &[]);
        Ok(())
    }
}

/// Writes every message to stderr, unconditionally.
#[derive(Debug, Default)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn warn(&self, message: &str, span: Option<&Span>, trace: &[StackFrame]) {
        eprintln!("Warning: {message}");
        if let Some(span) = span {
            eprint!("{}", render(span));
        }
        for frame in trace {
            eprintln!("    {frame}");
        }
    }

    fn debug(&self, message: &str, span: &Span) {
        let (line, col) = span.source.line_col(span.start);
        eprintln!("{}:{}:{} DEBUG: {}", span.source.url, line, col, message);
    }
}

/// Discards every message — backs `CompileOptions::quiet`.
#[derive(Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(&self, _message: &str, _span: Option<&Span>, _trace: &[StackFrame]) {}
    fn debug(&self, _message: &str, _span: &Span) {}
    fn warn_deprecated(&self, _deprecation: Deprecation, _message: &str, _span: &Span) -> SassResult<()> {
        Ok(())
    }
}

/// Policy for how a [`DeprecationAwareLogger`] treats each [`Deprecation`]
/// id — the `fatal_deprecations`/`future_deprecations`/`silence_deprecations`
/// configuration knobs from §6.
#[derive(Debug, Clone, Default)]
pub struct DeprecationPolicy {
    pub fatal: HashSet<Deprecation>,
    pub silenced: HashSet<Deprecation>,
    /// Deprecations opted into early (`future_deprecations`): tags whose
    /// new behavior a caller wants enabled now, ahead of this crate's
    /// default rollout schedule for them. Every [`Deprecation`] this crate
    /// currently defines already warns unconditionally once triggered, so
    /// this set has no observable effect yet — it's accepted and stored
    /// for parity with §6's configuration table, ready for a future
    /// deprecation that *is* gated behind an opt-in.
    pub future: HashSet<Deprecation>,
    /// Emit every repetition instead of limiting to 5 (`verbose`).
    pub verbose: bool,
}

/// Wraps another [`Logger`], applying [`DeprecationPolicy`] and limiting
/// repeated deprecation warnings to at most 5 per tag before collapsing
/// into a final summary count (§4.7).
pub struct DeprecationAwareLogger<'a> {
    inner: &'a dyn Logger,
    policy: DeprecationPolicy,
    limiter: RefCell<RepetitionLimiter>,
}

impl<'a> DeprecationAwareLogger<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn Logger, policy: DeprecationPolicy) -> Self {
        let limiter = if policy.verbose { RepetitionLimiter::with_limit(0) } else { RepetitionLimiter::new() };
        Self { inner, policy, limiter: RefCell::new(limiter) }
    }

    /// A one-line count of every deprecation tag that hit the repetition
    /// limit, for the "N repetitions of this warning were omitted" footer
    /// a host prints once compilation finishes.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let total = self.limiter.borrow().total_suppressed();
        if total == 0 {
            None
        } else {
            Some(format!("{total} repeated deprecation warning(s) omitted."))
        }
    }
}

impl Logger for DeprecationAwareLogger<'_> {
    fn warn(&self, message: &str, span: Option<&Span>, trace: &[StackFrame]) {
        self.inner.warn(message, span, trace);
    }

    fn debug(&self, message: &str, span: &Span) {
        self.inner.debug(message, span);
    }

    fn warn_deprecated(&self, deprecation: Deprecation, message: &str, span: &Span) -> SassResult<()> {
        if self.policy.silenced.contains(&deprecation) {
            return Ok(());
        }
        if self.policy.fatal.contains(&deprecation) {
            return Err(SassError::runtime(
                format!("{message} (this is an error because {deprecation} is a fatal deprecation)"),
                span.clone(),
            ));
        }
        match self.limiter.borrow_mut().admit(deprecation.id()) {
            Admission::Print(_) => {
                self.inner.warn(&format!("Deprecation [{deprecation}]: {message}"), Some(span), &[]);
            }
            Admission::Suppressed => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn span() -> Span {
        let url = url::Url::parse("file:///input.scss").unwrap();
        let source = Arc::new(SourceFile::new(url, "a {}"));
        Span::new(source, 0, 1)
    }

    #[test]
    fn silenced_deprecation_is_dropped() {
        let inner = NullLogger;
        let mut policy = DeprecationPolicy::default();
        policy.silenced.insert(Deprecation::Import);
        let logger = DeprecationAwareLogger::new(&inner, policy);
        assert!(logger.warn_deprecated(Deprecation::Import, "msg", &span()).is_ok());
    }

    #[test]
    fn fatal_deprecation_becomes_an_error() {
        let inner = NullLogger;
        let mut policy = DeprecationPolicy::default();
        policy.fatal.insert(Deprecation::Import);
        let logger = DeprecationAwareLogger::new(&inner, policy);
        assert!(logger.warn_deprecated(Deprecation::Import, "msg", &span()).is_err());
    }

    #[test]
    fn future_deprecation_is_accepted_but_does_not_change_behavior_today() {
        let inner = NullLogger;
        let mut policy = DeprecationPolicy::default();
        policy.future.insert(Deprecation::SlashDiv);
        let logger = DeprecationAwareLogger::new(&inner, policy);
        assert!(logger.warn_deprecated(Deprecation::SlashDiv, "msg", &span()).is_ok());
    }

    #[test]
    fn repeated_deprecation_is_limited_then_summarized() {
        let inner = NullLogger;
        let logger = DeprecationAwareLogger::new(&inner, DeprecationPolicy::default());
        for _ in 0..8 {
            logger.warn_deprecated(Deprecation::SlashDiv, "msg", &span()).unwrap();
        }
        assert!(logger.summary().is_some());
    }
}
