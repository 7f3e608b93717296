//! Fixed diagnostic codes and the reporter capability passes report through.
//!
//! Mirrors the teacher's `eprintln!("warning: ...")` voice for the default
//! reporter, but keeps diagnostics structured (code + source name + formatted
//! message) instead of ad hoc strings, since downstream tooling (an IDE, a
//! build log) needs to filter by code.

use std::fmt;

/// Severity of a diagnostic. Errors halt rewriting of the offending
/// construct; warnings allow best-effort salvage (spec.md §4.6, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The fixed set of diagnostic codes this crate can emit.
///
/// Identifiers are informative only (spec.md §4.6) — nothing downstream
/// parses the `Display` string, it's for humans and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// `define(...)` arity 0/≥3, or wrong argument kinds for arity 1/2.
    UnsupportedDefineSignature,
    /// A syntactically-matching `define(...)` call found below script root.
    NonTopLevelStatementDefine,
    /// An AMD dependency string contains `!` (a RequireJS plugin loader prefix).
    RequireJsPluginsNotSupported,
}

impl DiagnosticCode {
    /// The fixed severity for this code (spec.md §4.6 — each code has exactly
    /// one severity; diagnostics don't choose it per-occurrence).
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::UnsupportedDefineSignature => Severity::Error,
            DiagnosticCode::NonTopLevelStatementDefine => Severity::Error,
            DiagnosticCode::RequireJsPluginsNotSupported => Severity::Warning,
        }
    }

    /// The stable identifier, as it would appear in a diagnostic log.
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCode::UnsupportedDefineSignature => "UNSUPPORTED_DEFINE_SIGNATURE",
            DiagnosticCode::NonTopLevelStatementDefine => "NON_TOP_LEVEL_STATEMENT_DEFINE",
            DiagnosticCode::RequireJsPluginsNotSupported => "REQUIREJS_PLUGINS_NOT_SUPPORTED",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single diagnostic: which pass emitted it, against which source file,
/// at what position, with what formatted message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The source file name the offending construct came from.
    pub source_name: String,
    /// Best-effort 1-based line/column, when the donor node carried one.
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source_name: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            line: None,
            column: None,
            code,
            message: message.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(l), Some(c)) => write!(
                f,
                "{}:{}:{}: {}: [{}] {}",
                self.source_name,
                l,
                c,
                self.severity(),
                self.code,
                self.message
            ),
            _ => write!(
                f,
                "{}: {}: [{}] {}",
                self.source_name,
                self.severity(),
                self.code,
                self.message
            ),
        }
    }
}

/// The reporter capability a pass is given (spec.md §9 "Reporter coupling").
///
/// Passes accept `&mut dyn Reporter` rather than calling a global, so tests
/// can substitute `VecReporter` and the CLI can substitute a stderr-printing
/// one without the passes knowing the difference.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);

    fn has_errors(&self) -> bool {
        false
    }
}

/// Collects diagnostics in memory, for tests and for library callers that
/// want to inspect what happened instead of having it printed.
#[derive(Debug, Default)]
pub struct VecReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl VecReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity() == Severity::Warning)
    }
}

impl Reporter for VecReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity() == Severity::Error)
    }
}

/// Prints diagnostics to stderr as they're reported, in the teacher's
/// `eprintln!("warning: ...")` voice. Used by the CLI driver.
#[derive(Debug, Default)]
pub struct StderrReporter {
    error_count: usize,
    warning_count: usize,
}

impl StderrReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }
}

impl Reporter for StderrReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        eprintln!("{diagnostic}");
    }

    fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_fixed_per_code() {
        assert_eq!(DiagnosticCode::UnsupportedDefineSignature.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::NonTopLevelStatementDefine.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::RequireJsPluginsNotSupported.severity(), Severity::Warning);
    }

    #[test]
    fn vec_reporter_tracks_errors() {
        let mut reporter = VecReporter::new();
        assert!(!reporter.has_errors());
        reporter.report(Diagnostic::new(
            "a.js",
            DiagnosticCode::RequireJsPluginsNotSupported,
            "dep 'x!y' uses a plugin prefix",
        ));
        assert!(!reporter.has_errors());
        reporter.report(Diagnostic::new(
            "a.js",
            DiagnosticCode::UnsupportedDefineSignature,
            "define() called with 0 arguments",
        ));
        assert!(reporter.has_errors());
        assert_eq!(reporter.warnings().count(), 1);
        assert_eq!(reporter.errors().count(), 1);
    }

    #[test]
    fn stderr_reporter_counts_by_severity() {
        let mut reporter = StderrReporter::new();
        reporter.report(Diagnostic::new(
            "a.js",
            DiagnosticCode::RequireJsPluginsNotSupported,
            "dep 'x!y' uses a plugin prefix",
        ));
        reporter.report(Diagnostic::new(
            "a.js",
            DiagnosticCode::UnsupportedDefineSignature,
            "define() called with 0 arguments",
        ));
        assert_eq!(reporter.warning_count(), 1);
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.has_errors());
    }

    #[test]
    fn display_includes_code_and_source_name() {
        let diag = Diagnostic::new("foo/bar.js", DiagnosticCode::NonTopLevelStatementDefine, "nested define")
            .at(3, 5);
        let rendered = diag.to_string();
        assert!(rendered.contains("foo/bar.js"));
        assert!(rendered.contains("NON_TOP_LEVEL_STATEMENT_DEFINE"));
        assert!(rendered.contains("3:5"));
    }
}
