//! Ember compiler front-end.
//!
//! Pipeline: [`tokenize`] → [`parse`] → [`analyse`] → [`build_ir`], each
//! stage consuming the previous stage's output and raising a [`Diagnostic`]
//! on the first fatal error — there is no error-recovery parsing, matching
//! the single-error-per-run behavior described in the external interfaces.
//!
//! ```rust,ignore
//! use emberc::{compile_file, CompilerConfig};
//!
//! let outputs = compile_file(std::path::Path::new("hello.ember"), &CompilerConfig::default())?;
//! print!("{}", outputs.ir_text());
//! ```

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod dump;
pub mod env;
pub mod ir;
pub mod irgen;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod semantic;
pub mod token;
pub mod types;

pub use ast::Node;
pub use config::CompilerConfig;
pub use diagnostic::{Context, Diagnostic, ErrorKind, Stage};
pub use semantic::{AnalysisResult, SourceLoader};
pub use token::Token;
pub use types::Type;

use std::fs;
use std::path::{Path, PathBuf};

use lexer::Lexer;
use parser::Parser;
use semantic::Analyser;

/// Reads `<ident>.ember` from the entry file's own directory, then each of
/// `extra_include_dirs` in order, matching §6's "reads `<ident>.<source-ext>`
/// from disk" import rule. `stage` only affects the `Stage` tag on a
/// not-found [`Diagnostic`]; the same search applies during semantic
/// analysis and IR building.
pub struct FsLoader {
    dirs: Vec<PathBuf>,
    stage: Stage,
}

impl FsLoader {
    pub fn new(entry_dir: impl Into<PathBuf>, extra_include_dirs: &[PathBuf], stage: Stage) -> FsLoader {
        let mut dirs = vec![entry_dir.into()];
        dirs.extend(extra_include_dirs.iter().cloned());
        FsLoader { dirs, stage }
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, name: &str) -> Result<String, Diagnostic> {
        for dir in &self.dirs {
            let path = dir.join(format!("{}.ember", name));
            if let Ok(text) = fs::read_to_string(&path) {
                return Ok(text);
            }
        }
        Err(Diagnostic::new(
            ErrorKind::IoError,
            format!(
                "could not find import '{}' in {}",
                name,
                self.dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>().join(", ")
            ),
            None,
            Context::root(format!("{}.ember", name)),
            self.stage,
        ))
    }
}

#[tracing::instrument(skip_all)]
pub fn tokenize(source: &str, context: Context) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source, context).tokenize()
}

#[tracing::instrument(skip_all)]
pub fn parse(tokens: Vec<Token>, context: Context) -> Result<Node, Diagnostic> {
    Parser::new(tokens, context).parse()
}

#[tracing::instrument(skip_all)]
pub fn analyse(ast: &Node, context: Context, loader: &dyn SourceLoader) -> Result<AnalysisResult, Diagnostic> {
    Analyser::new(context, loader).analyse(ast)
}

#[tracing::instrument(skip_all)]
pub fn build_ir(
    ast: &Node,
    context: Context,
    analysis: &AnalysisResult,
    loader: &dyn SourceLoader,
) -> Result<ir::Module, Diagnostic> {
    irgen::build(context, ast, analysis, loader)
}

/// Everything produced by running the full pipeline over one entry file,
/// kept around so a driver can serve any combination of `-d` dump flags
/// without re-running earlier stages.
pub struct CompileOutputs {
    pub source: String,
    pub tokens: Vec<Token>,
    pub ast: Node,
    pub analysis: AnalysisResult,
    pub module: ir::Module,
    /// Name of the synthetic `load_<file>` function §3 wraps top-level code
    /// in — `link_executable` calls it from the `main` stub it appends.
    pub entry_symbol: String,
}

impl CompileOutputs {
    pub fn ir_text(&self) -> String {
        self.module.render()
    }
}

/// Run `tokenize → parse → analyse → build_ir` over `source_path`.
///
/// On error, `Diagnostic::render` needs the failing stage's source text to
/// print a caret-underlined excerpt; callers that display a top-level
/// failure should re-read `source_path` (or keep the text read here) rather
/// than assume one is embedded in the error.
pub fn compile_file(source_path: &Path, config: &CompilerConfig) -> Result<CompileOutputs, Diagnostic> {
    let context = Context::root(source_path.to_path_buf());
    let source = fs::read_to_string(source_path).map_err(|e| {
        Diagnostic::new(
            ErrorKind::IoError,
            format!("failed to read {}: {}", source_path.display(), e),
            None,
            context.clone(),
            Stage::Tokenizing,
        )
    })?;

    let entry_dir = source_path.parent().unwrap_or_else(|| Path::new("."));
    let entry_symbol = irgen::file_symbol(&context);

    let tokens = tokenize(&source, context.clone())?;

    let ast = parse(tokens.clone(), context.clone())?;

    let analysis_loader = FsLoader::new(entry_dir, &config.extra_include_dirs, Stage::SemanticAnalysis);
    let analysis = analyse(&ast, context.clone(), &analysis_loader)?;

    let irgen_loader = FsLoader::new(entry_dir, &config.extra_include_dirs, Stage::IrBuilding);
    let module = build_ir(&ast, context, &analysis, &irgen_loader)?;

    Ok(CompileOutputs {
        source,
        tokens,
        ast,
        analysis,
        module,
        entry_symbol,
    })
}

/// Link the emitted `.ll` text into an executable at `output_path` via the
/// system C toolchain, per §6 ("`gcc` must be on PATH to produce
/// executables"). Kept separate from [`compile_file`] since dump-only runs
/// (`-d ir`, `-d ast`, ...) never need to invoke a linker. `entry_symbol` is
/// `CompileOutputs::entry_symbol`; a tiny `main` that calls it is appended
/// to the IR text since the entry file's own `load_<file>` is never named
/// `main` itself.
pub fn link_executable(ir_text: &str, entry_symbol: &str, output_path: &Path, config: &CompilerConfig) -> Result<(), String> {
    let ir_path = output_path.with_extension("ll");
    let full_ir = format!(
        "{}\ndefine i32 @main() {{\nentry:\n  %r = call i32 @load_{}()\n  ret i32 %r\n}}\n",
        ir_text, entry_symbol
    );
    fs::write(&ir_path, full_ir).map_err(|e| format!("Failed to write IR file: {}", e))?;

    let gcc_name = match &config.target_triple {
        Some(triple) => format!("{}-gcc", triple),
        None => "gcc".to_string(),
    };
    let mut gcc = std::process::Command::new(&gcc_name);
    gcc.arg(&ir_path).arg("-o").arg(output_path);
    if config.optimize {
        gcc.arg("-O2");
    }

    let output = gcc.output().map_err(|e| format!("Failed to run {}: {}", gcc_name, e))?;
    fs::remove_file(&ir_path).ok();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("gcc compilation failed:\n{}", stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn compile_file_runs_the_full_pipeline_on_hello_world() {
        let mut file = tempfile::Builder::new().suffix(".ember").tempfile().unwrap();
        writeln!(file, "print('hello')").unwrap();
        let outputs = compile_file(file.path(), &CompilerConfig::default()).unwrap();
        assert!(outputs.ir_text().contains("@printf"));
        let expected_entry = format!("@load_{}", outputs.entry_symbol);
        assert!(outputs.ir_text().contains(&expected_entry));
    }

    #[test]
    fn compile_file_surfaces_a_semantic_diagnostic() {
        let mut file = tempfile::Builder::new().suffix(".ember").tempfile().unwrap();
        writeln!(file, "return undeclared").unwrap();
        let err = compile_file(file.path(), &CompilerConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSuchVar);
    }

    #[test]
    fn fs_loader_searches_extra_include_dirs_after_the_entry_dir() {
        let dir = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();
        std::fs::write(extra.path().join("helper.ember"), "fun noop() {\n}\n").unwrap();

        let loader = FsLoader::new(dir.path(), &[extra.path().to_path_buf()], Stage::IrBuilding);
        let text = loader.load("helper").unwrap();
        assert!(text.contains("noop"));
    }

    #[test]
    fn fs_loader_reports_io_error_when_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsLoader::new(dir.path(), &[], Stage::IrBuilding);
        let err = loader.load("missing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IoError);
    }
}
