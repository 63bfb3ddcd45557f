//! Unit tests for the `nestlist` CLI entrypoint module.

use super::render::{render, Glyphs};
use super::{check_summary, execute, parse_dimension, run_and_report, tree_output};
use super::{Cli, Commands};
use anyhow::{anyhow, Context};
use clap::Parser;
use nestlist_core::projection::Geometry;
use nestlist_core::{format, Config, OutlineError, ParseError, Session};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_outline(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write outline");
    path
}

fn run_cli(args: &[&str], config: &Config) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).expect("parse args");
    let mut out = Vec::new();
    execute(cli, config, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn run_and_report_returns_zero_on_success() {
    assert_eq!(run_and_report(|| Ok(())), 0);
}

#[test]
fn run_and_report_returns_non_zero_on_failure() {
    assert_eq!(run_and_report(|| Err(anyhow!("boom"))), 1);
}

#[test]
fn run_and_report_flags_malformed_outlines_with_exit_code_two() {
    let bare = run_and_report(|| Err(ParseError::MissingMarker { line: 3 }.into()));
    assert_eq!(bare, 2);

    let wrapped = run_and_report(|| {
        Err(OutlineError::from(ParseError::AmbiguousIndentation { line: 2 }))
            .context("failed to read outline.md")
    });
    assert_eq!(wrapped, 2);

    let io = run_and_report(|| {
        Err(OutlineError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        )))
        .context("failed to read outline.md")
    });
    assert_eq!(io, 1);
}

#[test]
fn render_args_parse_with_overrides() {
    let cli = Cli::try_parse_from([
        "nestlist",
        "render",
        "notes.md",
        "--expand-all",
        "--width",
        "40",
        "--ascii",
    ])
    .expect("parse render");
    match cli.command {
        Commands::Render {
            file,
            expand_all,
            width,
            height,
            ascii,
        } => {
            assert_eq!(file, Some(PathBuf::from("notes.md")));
            assert!(expand_all && ascii);
            assert_eq!(width, Some(40));
            assert_eq!(height, None);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(parse_dimension("0").is_err());
    assert!(parse_dimension("wide").is_err());
    assert_eq!(parse_dimension(" 12 "), Ok(12));
    assert!(Cli::try_parse_from(["nestlist", "render", "--height", "0"]).is_err());
}

#[test]
fn fmt_write_flag_parses_in_short_form() {
    let cli = Cli::try_parse_from(["nestlist", "fmt", "-w"]).expect("parse fmt");
    assert!(matches!(
        cli.command,
        Commands::Fmt {
            file: None,
            write: true
        }
    ));
}

#[test]
fn check_reports_shape_of_the_outline() {
    let doc = format::load_str("- a\n\t- b\n\t\t- c\n- d\n").expect("parse");
    assert_eq!(
        check_summary(Path::new("todo.md"), &doc),
        "todo.md: ok, 4 entries (2 top-level, max depth 2)"
    );
}

#[test]
fn check_command_fails_with_parse_exit_code_on_malformed_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_outline(&dir, "bad.md", "- a\n\t\t- too deep\n");
    let config = Config::default();
    let exit_code = run_and_report(|| run_cli(&["nestlist", "check", arg(&path)], &config).map(drop));
    assert_eq!(exit_code, 2);
}

#[test]
fn missing_file_and_missing_default_are_plain_failures() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent.md");
    let config = Config::default();

    let exit_code =
        run_and_report(|| run_cli(&["nestlist", "check", arg(&missing)], &config).map(drop));
    assert_eq!(exit_code, 1);

    let err = run_cli(&["nestlist", "tree"], &config).expect_err("no file");
    assert!(err.to_string().contains("NESTLIST_FILE"));
}

#[test]
fn default_file_is_used_when_no_path_is_given() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_outline(&dir, "default.md", "- only\n");
    let config = Config {
        default_file: Some(path.clone()),
        ..Config::default()
    };
    let output = run_cli(&["nestlist", "check"], &config).expect("check");
    assert_eq!(
        output.trim_end(),
        format!("{}: ok, 1 entries (1 top-level, max depth 0)", path.display())
    );
}

#[test]
fn fmt_prints_canonical_form_and_write_rewrites_in_place() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_outline(&dir, "messy.md", "- a\n\n\t- ~~b~~\r\n\n- **c**\n");
    let config = Config::default();

    let printed = run_cli(&["nestlist", "fmt", arg(&path)], &config).expect("fmt");
    assert_eq!(printed, "- a\n\t- ~~b~~\n- **c**\n");
    let untouched = std::fs::read_to_string(&path).expect("read back");
    assert!(untouched.contains("\n\n"));

    let written = run_cli(&["nestlist", "fmt", "--write", arg(&path)], &config).expect("fmt -w");
    assert!(written.is_empty());
    let rewritten = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(rewritten, printed);
}

#[test]
fn tree_lists_depth_flags_and_text() {
    let doc = format::load_str("- ~~a~~\n\t- **b**\n").expect("parse");
    let text = tree_output(&doc, false).expect("text tree");
    assert_eq!(text, "  0 x- a\n  1 -b   b");

    let json = tree_output(&doc, true).expect("json tree");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value[0]["text"], "a");
    assert_eq!(value[0]["crossed"], true);
    assert_eq!(value[1]["depth"], 1);
    assert_eq!(value[1]["bold"], true);
}

#[test]
fn completions_mention_the_binary_name() {
    let output = run_cli(&["nestlist", "completions", "bash"], &Config::default())
        .expect("completions");
    assert!(output.contains("nestlist"));
}

#[test]
fn render_paints_collapsed_outline_centred_on_the_head() {
    let doc = format::load_str("- a\n\t- b\n- c\n").expect("parse");
    let mut session = Session::new(doc, Geometry::new(20, 4));
    let lines = render(&mut session, Glyphs::new(true));
    assert_eq!(lines, vec!["", "", " > a", " - c"]);

    let unicode = render(&mut session, Glyphs::new(false));
    assert_eq!(unicode[3], " – c");
}

#[test]
fn render_wraps_text_by_row_width() {
    let doc = format::load_str("- abcdefghij\n").expect("parse");
    let mut session = Session::new(doc, Geometry::new(10, 4));
    let lines = render(&mut session, Glyphs::new(true));
    assert_eq!(lines, vec!["", " - abcdefg", "   hij", ""]);
}

#[test]
fn render_gives_wide_characters_two_cells() {
    let doc = format::load_str("- 日本語x\n").expect("parse");
    let mut session = Session::new(doc, Geometry::new(20, 1));
    assert_eq!(render(&mut session, Glyphs::new(true)), vec![" - 日本語x"]);

    // Four text columns hold four chars, but only two wide ones fit the grid.
    let doc = format::load_str("- 日本語x\n").expect("parse");
    let mut session = Session::new(doc, Geometry::new(7, 1));
    assert_eq!(render(&mut session, Glyphs::new(true)), vec![" - 日本"]);
}

#[test]
fn render_command_expands_all_and_marks_more_below() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_outline(&dir, "outline.md", "- a\n\t- b\n- ~~c~~\n");
    let config = Config::default();

    let output = run_cli(
        &[
            "nestlist",
            "render",
            arg(&path),
            "--expand-all",
            "--width",
            "20",
            "--height",
            "6",
            "--ascii",
        ],
        &config,
    )
    .expect("render");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines, vec!["", "", "", " v a", "    - b", " x c"]);

    let clipped = run_cli(
        &[
            "nestlist",
            "render",
            arg(&path),
            "--expand-all",
            "--width",
            "20",
            "--height",
            "4",
            "--ascii",
        ],
        &config,
    )
    .expect("render");
    let last = clipped.lines().last().expect("last line");
    assert!(last.starts_with("    - b"));
    assert!(last.ends_with('+'));
    assert_eq!(last.chars().count(), 20);
}
