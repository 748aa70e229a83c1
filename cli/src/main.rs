//! pmwiki2md CLI - PmWiki to Markdown conversion tool

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use pmwiki2md::model::list_pages;
use pmwiki2md::{
    convert_dir_with_progress, convert_page, BatchOptions, BatchReport, ConvertOptions,
    LineBreakStyle, PageIndex, DEFAULT_EXCLUDES,
};

const DEFAULT_OUTPUT: &str = "markdown_output";

#[derive(Parser)]
#[command(name = "pmwiki2md")]
#[command(version)]
#[command(about = "Convert PmWiki pages to Markdown", long_about = None)]
struct Cli {
    /// Directory of PmWiki page files
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every page of a directory
    Convert {
        /// Directory of PmWiki page files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "PMWIKI2MD_OUTPUT")]
        output: Option<PathBuf>,

        /// Page files to skip (replaces the default list)
        #[arg(short, long, value_name = "NAME", num_args = 1..)]
        excludes: Option<Vec<String>>,

        /// Write a JSON conversion report
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Convert one page at a time
        #[arg(long)]
        sequential: bool,

        /// Drop trailing backslashes instead of keeping hard breaks
        #[arg(long)]
        soft_breaks: bool,

        /// Prefix for attachment links
        #[arg(long, value_name = "PREFIX", default_value = "/uploads")]
        upload_prefix: String,
    },

    /// Convert a single page file
    Page {
        /// PmWiki page file (Book.Page)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Drop trailing backslashes instead of keeping hard breaks
        #[arg(long)]
        soft_breaks: bool,
    },

    /// Print the page index as JSON
    Index {
        /// Directory of PmWiki page files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Page files to skip (replaces the default list)
        #[arg(short, long, value_name = "NAME", num_args = 1..)]
        excludes: Option<Vec<String>>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            excludes,
            report,
            sequential,
            soft_breaks,
            upload_prefix,
        }) => {
            let convert = ConvertOptions::new()
                .with_upload_prefix(upload_prefix)
                .with_line_breaks(line_break_style(soft_breaks));
            let mut options = BatchOptions::new()
                .with_excludes(exclusion_set(excludes))
                .with_convert_options(convert);
            if sequential {
                options = options.sequential();
            }
            cmd_convert(&input, output.as_deref(), &options, report.as_deref())
        }
        Some(Commands::Page {
            input,
            output,
            soft_breaks,
        }) => cmd_page(&input, output.as_deref(), soft_breaks),
        Some(Commands::Index {
            input,
            excludes,
            compact,
        }) => cmd_index(&input, exclusion_set(excludes), compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &BatchOptions::default(), None)
            } else {
                println!("{}", "Usage: pmwiki2md <INPUT_DIR> [OUTPUT]".yellow());
                println!("       pmwiki2md --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn exclusion_set(excludes: Option<Vec<String>>) -> BTreeSet<String> {
    match excludes {
        Some(names) => names.into_iter().collect(),
        None => DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
    }
}

fn line_break_style(soft: bool) -> LineBreakStyle {
    if soft {
        LineBreakStyle::Soft
    } else {
        LineBreakStyle::Hard
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: &BatchOptions,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let total = list_pages(input, &options.excludes)?.len();
    info!(
        "Converting {} pages from {} into {}",
        total,
        input.display(),
        output_dir.display()
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Converting...");

    let report = convert_dir_with_progress(input, &output_dir, options, |name| {
        pb.inc(1);
        pb.set_message(name.to_string());
    })?;

    pb.finish_with_message("Done!");
    info!(
        "Converted {} pages with {} unresolved links",
        report.page_count(),
        report.diagnostic_count()
    );

    print_summary(&report);

    if let Some(path) = report_path {
        fs::write(path, report.to_json(true)?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!("\n{}", "Conversion Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Output".bold(), report.output_dir.display());
    println!("{}: {}", "Books".bold(), report.books);
    println!("{}: {}", "Pages".bold(), report.page_count());
    println!("{}: {}", "Excluded".bold(), report.excluded.len());

    let count = report.diagnostic_count();
    if count == 0 {
        println!("{}: {}", "Unresolved links".bold(), "0".green());
        return;
    }

    println!("{}: {}", "Unresolved links".bold(), count.to_string().yellow());
    for diagnostic in report.diagnostics() {
        println!("  {} {}", "├─".dimmed(), diagnostic);
    }
}

fn cmd_page(
    input: &Path,
    output: Option<&Path>,
    soft_breaks: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::new().with_line_breaks(line_break_style(soft_breaks));
    debug!("Converting single page {}", input.display());
    let result = convert_page(input, &options)?;

    for diagnostic in &result.diagnostics {
        eprintln!("{}: {}", "Warning".yellow().bold(), diagnostic);
    }

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", result.content);
    }

    Ok(())
}

fn cmd_index(
    input: &Path,
    excludes: BTreeSet<String>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = PageIndex::from_dir(input, &excludes)?;
    debug!(
        "Indexed {} pages in {} books",
        index.page_count(),
        index.book_count()
    );

    let json = if compact {
        serde_json::to_string(&index)?
    } else {
        serde_json::to_string_pretty(&index)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pmwiki2md".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PmWiki to Markdown conversion tool");
    println!();
    println!("Features:");
    println!("  - Page index with cross-book link resolution");
    println!("  - Simple and directive tables");
    println!("  - Fenced code blocks");
    println!("  - Parallel conversion");
}
