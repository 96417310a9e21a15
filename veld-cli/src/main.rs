use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use veld_core::cfg;
use veld_core::diagnostic::Diagnostic;
use veld_core::{compile, lex_source, parse_source, CompileOptions, CoreError};

#[derive(Parser, Debug)]
#[command(version, about = "Veld compiler driver", long_about = None)]
struct Cli {
    /// Source file; stdin when omitted.
    input: Option<String>,

    #[arg(short, long)]
    output: Option<String>,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "ir",
        value_parser = ["tokens", "ast", "cfg", "ir"],
        help = "What to emit: tokens, ast, cfg or ir"
    )]
    emit: String,

    #[arg(long, help = "Skip the local optimization passes")]
    no_opt: bool,

    #[arg(short, long, help = "Verbose compiler logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let (name, source) = read_input(cli.input.as_deref())?;
    debug!(input = %name, bytes = source.len(), "read source");

    let rendered = match cli.emit.as_str() {
        "tokens" => {
            let mut out = String::new();
            for token in lex_source(&source) {
                out.push_str(&token.to_string());
                out.push('\n');
            }
            out
        }
        "ast" => {
            let ctx = parse_source(&name, &source);
            render_diagnostics(ctx.diagnostics(), &name, &source);
            let mut out = String::new();
            for node in ctx.nodes() {
                out.push_str(&node.to_string());
                out.push('\n');
            }
            out
        }
        "cfg" => {
            let ctx = parse_source(&name, &source);
            render_diagnostics(ctx.diagnostics(), &name, &source);
            cfg::render(&cfg::build(ctx.nodes()))
        }
        _ => {
            let options = CompileOptions {
                optimize: !cli.no_opt,
            };
            match compile(&name, &source, options) {
                Ok(artifact) => {
                    debug!("compilation succeeded");
                    artifact.ir
                }
                Err(CoreError::Diagnostics(diags)) => {
                    render_diagnostics(&diags, &name, &source);
                    return Err(anyhow::anyhow!("compilation failed"));
                }
                Err(e) => return Err(anyhow::anyhow!(e.to_string())),
            }
        }
    };

    match &cli.output {
        Some(path) => write_output(path, rendered.as_bytes())?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn read_input(input: Option<&str>) -> Result<(String, String)> {
    match input {
        Some(path) if path != "-" => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {path}"))?;
            Ok((path.to_string(), source))
        }
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(("<stdin>".to_string(), buffer))
        }
    }
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = PathBuf::from(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}

fn render_diagnostics(diags: &[Diagnostic], name: &str, source: &str) {
    for d in diags {
        eprintln!("{d}");
        if let Some(loc) = d.loc {
            // Columns are stored 0-based; people count from 1.
            eprintln!(" --> {name}:{line}:{col}", line = loc.line, col = loc.col + 1);
            if let Some(text) = source.lines().nth(loc.line.saturating_sub(1) as usize) {
                eprintln!("  {line:>4} | {text}", line = loc.line);
                eprintln!("       | {spaces}^", spaces = " ".repeat(loc.col as usize));
            }
        }
        eprintln!();
    }
}
