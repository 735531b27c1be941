//! enrich - article HTML enhancement tool
//!
//! A CLI for running the content enhancement pipeline over CMS-exported
//! article HTML files, singly or as a directory batch.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use enrich::{EnhanceError, EnhanceReport, Enhancer, SiteConfig};
use itertools::Itertools;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Main entry point for the enrich CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance {
            input,
            output,
            config,
            toc,
            verbose,
        } => handle_enhance_command(input, output, config, toc, verbose),

        Commands::Toc {
            input,
            output,
            config,
        } => handle_toc_command(input, output, config),

        Commands::Batch {
            input,
            output,
            config,
            verbose,
        } => handle_batch_command(input, output, config, verbose),
    }
}

/// Handle the enhance command
fn handle_enhance_command(
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    toc: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);
    let config = load_config(config)?;
    let html = read_input(&input)?;

    println!("Enhancing {}...", display_input(&input));

    let enhancer = Enhancer::new(config);
    let doc = enrich::dom::parse_document(&html);

    match enhancer.enhance_document(&doc) {
        Ok(report) => {
            write_output(&output, &enrich::dom::to_html(&doc))?;
            println!(
                "✓ {} enhancement(s) applied: {}",
                report.total_changed(),
                summarize(&report)
            );
            if !report.pending_images.is_empty() {
                println!(
                    "  {} image(s) await dimensions and will classify on a later run",
                    report.pending_images.len()
                );
            }
            if let Some(toc_path) = toc {
                let json = serde_json::to_string_pretty(&report.toc)
                    .context("Failed to serialize heading index")?;
                write_output(&toc_path, &json)?;
                println!("✓ Wrote heading index: {}", toc_path.display());
            }
            println!("✓ Successfully wrote: {}", output.display());
        }
        Err(EnhanceError::ContainerNotFound(selector)) => {
            log::warn!(
                "no content container matches {:?}; passing input through unmodified",
                selector
            );
            write_output(&output, &html)?;
            println!("! No content container found, copied input unmodified");
            println!("✓ Successfully wrote: {}", output.display());
        }
        Err(e) => return Err(e).context("Failed to enhance document"),
    }

    Ok(())
}

/// Handle the toc command
fn handle_toc_command(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    init_logging(false);
    let config = load_config(config)?;
    let html = read_input(&input)?;

    let enhancer = Enhancer::new(config);
    let doc = enrich::dom::parse_document(&html);

    let toc = match enhancer.enhance_document(&doc) {
        Ok(report) => report.toc,
        Err(EnhanceError::ContainerNotFound(_)) => enrich::TocIndex::default(),
        Err(e) => return Err(e).context("Failed to build heading index"),
    };

    let json =
        serde_json::to_string_pretty(&toc).context("Failed to serialize heading index")?;
    match output {
        Some(path) => {
            write_output(&path, &json)?;
            println!("✓ Wrote heading index: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Handle the batch command
fn handle_batch_command(
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);
    let config = load_config(config)?;
    let enhancer = Enhancer::new(config);

    println!("Enhancing articles under {}...", input.display());

    let mut enhanced = 0usize;
    let mut passed_through = 0usize;

    for entry in WalkDir::new(&input)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.path().is_file() {
            continue;
        }
        let ext = entry.path().extension().and_then(|s| s.to_str());
        if !matches!(ext, Some("html") | Some("htm")) {
            continue;
        }

        let rel = entry.path().strip_prefix(&input).unwrap_or(entry.path());
        let target = output.join(rel);
        let html = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        let doc = enrich::dom::parse_document(&html);

        match enhancer.enhance_document(&doc) {
            Ok(report) => {
                write_output(&target, &enrich::dom::to_html(&doc))?;
                enhanced += 1;
                if verbose {
                    println!(
                        "  {} - {} enhancement(s)",
                        rel.display(),
                        report.total_changed()
                    );
                }
            }
            Err(EnhanceError::ContainerNotFound(_)) => {
                log::warn!(
                    "{}: no content container, passing through unmodified",
                    entry.path().display()
                );
                write_output(&target, &html)?;
                passed_through += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to enhance {}", entry.path().display()))
            }
        }
    }

    println!(
        "✓ Enhanced {} article(s), {} passed through unmodified",
        enhanced, passed_through
    );

    Ok(())
}

/// Initialize logging; verbose mode turns on per-element debug output
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

/// Load configuration: explicit path, ./enrich.toml when present, else stock
fn load_config(path: Option<PathBuf>) -> Result<SiteConfig> {
    match path {
        Some(p) => SiteConfig::load(&p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None if Path::new("enrich.toml").exists() => {
            SiteConfig::load("enrich.toml").context("Failed to load enrich.toml")
        }
        None => Ok(SiteConfig::default()),
    }
}

/// Read an input file, with "-" meaning stdin
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn display_input(path: &Path) -> String {
    if path == Path::new("-") {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Write a file, creating parent directories as needed
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// One-line per-unit change summary
fn summarize(report: &EnhanceReport) -> String {
    let parts = report
        .units
        .iter()
        .filter(|u| u.changed > 0)
        .map(|u| format!("{} x{}", u.id, u.changed))
        .join(", ");
    if parts.is_empty() {
        "nothing to do".to_string()
    } else {
        parts
    }
}
