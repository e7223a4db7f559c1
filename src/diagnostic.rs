//! Error taxonomy, the `Context` backtrace chain, and caret-underlined
//! rendering of diagnostics.
//!
//! `Context` is an `Rc`-linked chain rather than an owned tree so that a
//! `Diagnostic` captured mid-compilation can hold a cheap clone of the
//! chain as it stood at the error site, unaffected by pushes/pops the
//! parser or IR builder perform afterward.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::position::Position;

/// One frame of the nested-compilation-unit backtrace: a file being
/// processed, optionally nested inside the function currently being
/// lowered or parsed.
struct ContextFrame {
    parent: Option<Context>,
    name: String,
    file: PathBuf,
}

/// A cheap-to-clone handle onto a `Context` chain. Pushing deeper creates a
/// new frame pointing at the current one as parent; popping is simply
/// discarding the handle and going back to holding the parent.
#[derive(Clone)]
pub struct Context(Rc<ContextFrame>);

impl Context {
    pub fn root(file: impl Into<PathBuf>) -> Context {
        Context(Rc::new(ContextFrame {
            parent: None,
            name: "<module>".to_string(),
            file: file.into(),
        }))
    }

    /// Push a new named frame (entering a function body or an imported file).
    pub fn push(&self, name: impl Into<String>, file: impl Into<PathBuf>) -> Context {
        Context(Rc::new(ContextFrame {
            parent: Some(self.clone()),
            name: name.into(),
            file: file.into(),
        }))
    }

    /// The frame this one was pushed from, if any.
    pub fn parent(&self) -> Option<Context> {
        self.0.parent.clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn file(&self) -> &PathBuf {
        &self.0.file
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t\t:{}", self.name(), self.file().display())?;
        if let Some(parent) = self.parent() {
            write!(f, "\n\t\t{}", parent)?;
        }
        Ok(())
    }
}

/// Which pipeline stage raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tokenizing,
    Parsing,
    SemanticAnalysis,
    IrBuilding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Tokenizing => "tokenizing",
            Stage::Parsing => "parsing",
            Stage::SemanticAnalysis => "semantic-analysis",
            Stage::IrBuilding => "ir-building",
        };
        write!(f, "{}", s)
    }
}

/// The closed set of diagnostic kinds the pipeline can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalChar,
    InvalidSyntax,
    UnknownNode,
    NoSuchVar,
    /// Wraps a non-diagnostic failure (e.g. an I/O error surfaced mid-stage)
    /// with position/context attached.
    CaughtError,
    TypeError,
    /// A well-formed but not-yet-implemented lowering (e.g. `list + list`).
    RuntimeError,
    IoError,
    DuplicateName,
    IndexError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::IllegalChar => "Illegal Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::UnknownNode => "Unknown Node",
            ErrorKind::NoSuchVar => "No such Variable",
            ErrorKind::CaughtError => "Compiler Error",
            ErrorKind::TypeError => "Type Error",
            ErrorKind::RuntimeError => "Runtime Exception",
            ErrorKind::IoError => "Input-Output Exception",
            ErrorKind::DuplicateName => "Duplicate Name",
            ErrorKind::IndexError => "Index Error",
        };
        write!(f, "{}", s)
    }
}

/// A fatal, structured error for a single compilation unit.
#[derive(Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub details: String,
    pub position: Option<Position>,
    pub context: Context,
    pub stage: Stage,
}

impl Diagnostic {
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        position: Option<Position>,
        context: Context,
        stage: Stage,
    ) -> Diagnostic {
        Diagnostic {
            kind,
            details: details.into(),
            position,
            context,
            stage,
        }
    }

    /// Render the message, the `Context` chain, and (when source text is
    /// available) a caret-underlined excerpt spanning `position.len` columns
    /// with one line of context before and after.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}: {} [{}]\n",
            self.kind, self.details, self.stage
        ));
        out.push_str(&format!("  at {}\n", self.context));

        if let (Some(pos), Some(text)) = (self.position, source) {
            let lines: Vec<&str> = text.lines().collect();
            let line_idx = pos.line;

            if line_idx > 0 {
                if let Some(prev) = lines.get(line_idx - 1) {
                    out.push_str(&format!("  {:>4} | {}\n", line_idx, prev));
                }
            }
            if let Some(cur) = lines.get(line_idx) {
                out.push_str(&format!("  {:>4} | {}\n", line_idx + 1, cur));
                let caret_len = pos.len.max(1);
                let caret = "^".repeat(caret_len);
                out.push_str(&format!(
                    "       | {}{}\n",
                    " ".repeat(pos.column),
                    caret
                ));
            }
            if let Some(next) = lines.get(line_idx + 1) {
                out.push_str(&format!("  {:>4} | {}\n", line_idx + 2, next));
            }
        }

        out
    }
}

impl fmt::Debug for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Diagnostic {{ kind: {}, details: {:?}, stage: {} }}",
            self.kind, self.details, self.stage
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(
                f,
                "{}: {}, File {}, line {}, pos {}",
                self.kind,
                self.details,
                self.context.file().display(),
                pos.line + 1,
                pos.column
            )
        } else {
            write!(
                f,
                "{}: {}, File {}",
                self.kind,
                self.details,
                self.context.file().display()
            )
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chain_renders_parents() {
        let root = Context::root("main.ember");
        let inner = root.push("add", "main.ember");
        let rendered = format!("{}", inner);
        assert!(rendered.contains("add"));
        assert!(rendered.contains("<module>"));
    }

    #[test]
    fn cloning_context_survives_later_pushes() {
        let root = Context::root("main.ember");
        let snapshot = root.push("f", "main.ember");
        // Further pushes off `root` must not retroactively change `snapshot`.
        let _unrelated = root.push("g", "main.ember");
        assert_eq!(snapshot.name(), "f");
    }

    #[test]
    fn render_includes_caret_underline() {
        let ctx = Context::root("main.ember");
        let mut pos = Position::start();
        pos.line = 1;
        pos.column = 4;
        pos.len = 3;
        let diag = Diagnostic::new(
            ErrorKind::NoSuchVar,
            "'foo' is not defined",
            Some(pos),
            ctx,
            Stage::SemanticAnalysis,
        );
        let rendered = diag.render(Some("x <- 1\nreturn foo\n"));
        assert!(rendered.contains("^^^"));
        assert!(rendered.contains("return foo"));
    }

    #[test]
    fn display_without_source_has_no_excerpt() {
        let ctx = Context::root("main.ember");
        let diag = Diagnostic::new(
            ErrorKind::IllegalChar,
            "found '@'",
            None,
            ctx,
            Stage::Tokenizing,
        );
        assert!(format!("{}", diag).contains("Illegal Character"));
    }
}
