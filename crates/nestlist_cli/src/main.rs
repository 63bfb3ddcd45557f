//! Command-line front end for nestlist outlines.

mod render;

use anyhow::{anyhow, bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use nestlist_core::{format, Config, Document, OutlineError, ParseError, Session};
use render::Glyphs;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "nestlist=warn,nestlist_core=info";

#[derive(Parser, Debug)]
#[command(name = "nestlist", about = "Outline checker, formatter and renderer", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Parse an outline and report its shape
    Check {
        /// Outline file (defaults to NESTLIST_FILE)
        file: Option<PathBuf>,
    },
    /// Print the outline in canonical form
    Fmt {
        /// Outline file (defaults to NESTLIST_FILE)
        file: Option<PathBuf>,
        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
    },
    /// Dump every entry with its depth and flags
    Tree {
        /// Outline file (defaults to NESTLIST_FILE)
        file: Option<PathBuf>,
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Paint the opening screen of an outline
    Render {
        /// Outline file (defaults to NESTLIST_FILE)
        file: Option<PathBuf>,
        /// Expand every entry before painting
        #[arg(long)]
        expand_all: bool,
        /// Screen columns (overrides NESTLIST_WIDTH)
        #[arg(long, value_parser = parse_dimension)]
        width: Option<usize>,
        /// Screen lines (overrides NESTLIST_HEIGHT)
        #[arg(long, value_parser = parse_dimension)]
        height: Option<usize>,
        /// Use ASCII bullet glyphs
        #[arg(long)]
        ascii: bool,
    },
}

fn parse_dimension(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Output goes to stdout, so logs stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn main() {
    init_tracing();
    let exit_code = run_and_report(|| run(Cli::parse()));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Run `runner`, print its error chain, and map the outcome to a process exit code.
///
/// # Returns
/// `0` on success, `2` when the failure is a malformed outline, `1` otherwise.
fn run_and_report<F>(runner: F) -> i32
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("nestlist: {:#}", err);
            exit_code_for(&err)
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let malformed = err.chain().any(|cause| {
        cause.downcast_ref::<ParseError>().is_some()
            || matches!(
                cause.downcast_ref::<OutlineError>(),
                Some(OutlineError::Parse(_))
            )
    });
    if malformed {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &config, &mut out)
}

fn execute<W: Write>(cli: Cli, config: &Config, out: &mut W) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, out);
        }
        Commands::Check { file } => {
            let path = resolve_file(file, config)?;
            let doc = load_document(&path)?;
            let violations = doc.link_violations();
            if !violations.is_empty() {
                bail!(
                    "{}: inconsistent tree links: {}",
                    path.display(),
                    violations.join("; ")
                );
            }
            writeln!(out, "{}", check_summary(&path, &doc))?;
        }
        Commands::Fmt { file, write } => {
            let path = resolve_file(file, config)?;
            if write {
                let session = Session::from_file(&path, config.geometry(None, None))
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let lines = session
                    .save()
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), lines, "rewrote outline");
            } else {
                let doc = load_document(&path)?;
                out.write_all(format::dump_to_string(&doc).as_bytes())?;
            }
        }
        Commands::Tree { file, json } => {
            let path = resolve_file(file, config)?;
            let doc = load_document(&path)?;
            writeln!(out, "{}", tree_output(&doc, json)?)?;
        }
        Commands::Render {
            file,
            expand_all,
            width,
            height,
            ascii,
        } => {
            let path = resolve_file(file, config)?;
            let mut session = Session::from_file(&path, config.geometry(width, height))
                .with_context(|| format!("failed to read {}", path.display()))?;
            if expand_all {
                session.expand_all()?;
            }
            let glyphs = Glyphs::new(ascii || config.ascii_bullets);
            for line in render::render(&mut session, glyphs) {
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}

fn resolve_file(file: Option<PathBuf>, config: &Config) -> anyhow::Result<PathBuf> {
    file.or_else(|| config.default_file.clone())
        .ok_or_else(|| anyhow!("no outline file given and NESTLIST_FILE is not set"))
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let doc = format::load(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(doc)
}

fn check_summary(path: &Path, doc: &Document) -> String {
    let mut top_level = 0usize;
    let mut max_depth = 0usize;
    for (_, depth) in doc.iter() {
        if depth == 0 {
            top_level += 1;
        }
        max_depth = max_depth.max(depth);
    }
    format!(
        "{}: ok, {} entries ({} top-level, max depth {})",
        path.display(),
        doc.len(),
        top_level,
        max_depth
    )
}

fn tree_output(doc: &Document, json: bool) -> anyhow::Result<String> {
    let snapshot = doc.snapshot();
    if json {
        return serde_json::to_string_pretty(&snapshot).context("failed to encode tree as JSON");
    }

    let rows: Vec<String> = snapshot
        .iter()
        .map(|entry| {
            format!(
                "{:>3} {}{} {}{}",
                entry.depth,
                if entry.crossed { 'x' } else { '-' },
                if entry.bold { 'b' } else { '-' },
                "  ".repeat(entry.depth),
                entry.text
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

#[cfg(test)]
mod tests;
