//! Ember Compiler CLI
//!
//! Command-line interface for compiling .ember programs to executables and
//! for dumping the intermediate artifacts of each pipeline stage.

use clap::{Parser as ClapParser, ValueEnum};
use emberc::{dump, CompilerConfig};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpKind {
    Tokens,
    Ast,
    Ir,
    Asm,
}

#[derive(ClapParser)]
#[command(name = "emberc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ember compiler - compile .ember programs to executables", long_about = None)]
struct Cli {
    /// Entry source file
    input: PathBuf,

    /// Dump a pipeline artifact (repeatable)
    #[arg(short = 'd', long = "dump", value_enum)]
    dumps: Vec<DumpKind>,

    /// Output basename (defaults to the input filename without extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable backend optimization
    #[arg(long = "no_opt")]
    no_opt: bool,

    /// Run immediately instead of emitting an executable
    #[arg(long = "run")]
    run: bool,

    /// Path to an `emberc.toml` project configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match CompilerConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => CompilerConfig::load(&PathBuf::from("emberc.toml")).unwrap_or_default(),
    };
    if cli.no_opt {
        config.optimize = false;
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        let stem = cli.input.file_stem().unwrap_or_default();
        PathBuf::from(stem)
    });

    run_build(&cli, &output, &config);
}

fn run_build(cli: &Cli, output: &PathBuf, config: &CompilerConfig) {
    debug!(input = %cli.input.display(), "compiling");

    let outputs = match emberc::compile_file(&cli.input, config) {
        Ok(outputs) => outputs,
        Err(diag) => {
            let source = std::fs::read_to_string(&cli.input).ok();
            eprintln!("{}", diag.render(source.as_deref()));
            error!(%diag, "compilation failed");
            process::exit(1);
        }
    };

    for kind in &cli.dumps {
        match kind {
            DumpKind::Tokens => write_dump(output, "tokens", &dump::dump_tokens(&outputs.tokens)),
            DumpKind::Ast => write_dump(output, "json", &dump::dump_ast(&outputs.ast)),
            DumpKind::Ir => write_dump(output, "ll", &outputs.ir_text()),
            DumpKind::Asm => {
                eprintln!(
                    "Error: assembly dump requires a target-machine backend, which this build does not include"
                );
                process::exit(1);
            }
        }
    }

    if cli.run {
        eprintln!("Error: JIT execution requires a target-machine backend, which this build does not include");
        process::exit(1);
    }

    match emberc::link_executable(&outputs.ir_text(), &outputs.entry_symbol, output, config) {
        Ok(()) => println!("Compiled {} -> {}", cli.input.display(), output.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn write_dump(output: &PathBuf, ext: &str, contents: &str) {
    let path = output.with_extension(ext);
    if let Err(e) = std::fs::write(&path, contents) {
        eprintln!("Error writing {}: {}", path.display(), e);
        process::exit(1);
    }
    println!("Wrote {}", path.display());
}
