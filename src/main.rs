//! tsdgen — generate TypeScript declaration files from JSDoc doclet records.
//!
//! Two modes:
//!
//! - **stdin mode**: `tsdgen < doclets.json`
//! - **file mode**: `tsdgen -o types.d.ts build/doclets/*.json`

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tsdgen::{Config, Doclet};

#[derive(Parser)]
#[command(
    name = "tsdgen",
    about = "Generate TypeScript declaration files from JSDoc doclet records"
)]
struct Cli {
    /// Input doclet JSON files (glob patterns supported). If omitted,
    /// reads a doclet array from stdin.
    files: Vec<String>,

    /// Output file path. Writes to stdout when omitted.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: dts (default), json
    #[arg(short = 'f', long, default_value = "dts")]
    format: String,

    /// Configuration file (JSON; // and /* */ comments allowed)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Latest released version; items with a newer @since are excluded
    #[arg(long)]
    latest_version: Option<String>,

    /// Include every item regardless of its @since tag
    #[arg(long)]
    ignore_since_tag: bool,

    /// Report items skipped by the version gate
    #[arg(long)]
    log_skipped: bool,

    /// Exclude doclets without a doc comment
    #[arg(long)]
    skip_undocumented: bool,

    /// Exclude a doclet scope. Can be specified multiple times,
    /// e.g. --ignore-scope inner
    #[arg(long = "ignore-scope")]
    ignore_scopes: Vec<String>,

    /// Pass @example blocks through to the output
    #[arg(long)]
    include_examples: bool,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = build_config(&cli)?;

    let doclets = if cli.files.is_empty() {
        read_stdin()?
    } else {
        read_files(&expand_globs(&cli.files)?)?
    };

    let tree = tsdgen::Parser::new(config).parse(&doclets)?;
    let renderer = tsdgen::render::create_renderer(&cli.format)?;
    let output = renderer.render(&tree);

    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", output),
    }
    Ok(())
}

/// Config file first, CLI flags layered on top.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(latest) = &cli.latest_version {
        config.latest_version = Some(latest.clone());
    }
    config.ignore_since_tag |= cli.ignore_since_tag;
    config.log_items_skipped_by_since |= cli.log_skipped;
    config.skip_undocumented |= cli.skip_undocumented;
    config.include_examples |= cli.include_examples;
    config.ignore_scopes.extend(cli.ignore_scopes.iter().cloned());
    Ok(config)
}

fn read_stdin() -> Result<Vec<Doclet>> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    serde_json::from_str(&input).context("stdin is not a doclet JSON array")
}

/// Read and concatenate doclet arrays, preserving file order.
fn read_files(paths: &[PathBuf]) -> Result<Vec<Doclet>> {
    let mut doclets = Vec::new();
    for path in paths {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut batch: Vec<Doclet> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a doclet JSON array", path.display()))?;
        doclets.append(&mut batch);
    }
    Ok(doclets)
}

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for .json files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json") {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("TSDGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_overlay_config() {
        let cli = Cli {
            files: vec![],
            output: None,
            format: "dts".into(),
            config: None,
            latest_version: Some("2.0.0".into()),
            ignore_since_tag: false,
            log_skipped: true,
            skip_undocumented: true,
            ignore_scopes: vec!["inner".into()],
            include_examples: false,
            verbose: false,
        };
        let config = build_config(&cli).unwrap();
        assert_eq!(config.latest_version.as_deref(), Some("2.0.0"));
        assert!(config.log_items_skipped_by_since);
        assert!(config.skip_undocumented);
        assert_eq!(config.ignore_scopes, ["inner"]);
    }
}
