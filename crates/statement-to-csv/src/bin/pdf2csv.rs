use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use statement_to_csv::{
    ConversionReport, DEFAULT_OCR_LANGUAGE, DEFAULT_RENDER_DPI, ExtractError, ExtractOptions,
    HeaderPolicy, PageSelection, TesseractOcr, TracingSink, convert_pdf_to_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2csv",
    version,
    about = "Convert bank statement PDFs into CSV, falling back to OCR for scanned pages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract statement rows and write them as CSV.
    Extract(ExtractArgs),
    /// Report whether pdftoppm and tesseract are installed.
    CheckOcr,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = statement_to_csv::DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Minimum cells required per candidate table row.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// Resolution used when rendering pages for OCR.
    #[arg(long, default_value_t = DEFAULT_RENDER_DPI)]
    dpi: u32,

    /// Tesseract language code.
    #[arg(long, default_value = DEFAULT_OCR_LANGUAGE)]
    lang: String,

    /// Skip OCR for pages without a table.
    #[arg(long)]
    no_ocr: bool,

    /// Drop rows on later pages that repeat the header row.
    #[arg(long)]
    drop_repeated_headers: bool,

    /// Print every page-level event after the run.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let header_policy = if args.drop_repeated_headers {
        HeaderPolicy::DropRepeated
    } else {
        HeaderPolicy::FirstRowOnly
    };

    Ok(ExtractOptions {
        pages,
        delimiter: args.delimiter as u8,
        min_cols: args.min_cols,
        header_policy,
        ocr_fallback: !args.no_ocr,
        render_dpi: args.dpi,
    })
}

fn log_report(report: &ConversionReport, verbose: bool) {
    eprintln!(
        "wrote {} row(s) as {} from {} page(s) (tables on {:?}, OCR on {:?})",
        report.row_count,
        report.mode.as_str(),
        report.page_count,
        report.table_pages,
        report.ocr_pages
    );
    if verbose {
        for event in &report.warnings {
            eprintln!(
                "  - {} {:?} page={:?} confidence={:?}: {}",
                event.severity, event.code, event.page, event.confidence, event.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ConversionReport> {
    let options = parse_options(args)?;
    let ocr = TesseractOcr::new(args.lang.clone());
    convert_pdf_to_csv(
        &args.input,
        &args.output,
        &options,
        &ocr,
        &mut TracingSink,
    )
    .with_context(|| format!("failed to convert '{}'", args.input.display()))
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("statement_to_csv=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                if matches!(
                    error.downcast_ref::<ExtractError>(),
                    Some(ExtractError::NoDataExtracted)
                ) {
                    ExitCode::from(2)
                } else {
                    ExitCode::from(1)
                }
            }
        },
        Commands::CheckOcr => {
            if TesseractOcr::is_available() {
                println!("pdftoppm and tesseract found");
                ExitCode::SUCCESS
            } else {
                println!("OCR unavailable: install poppler-utils and tesseract-ocr");
                ExitCode::from(1)
            }
        }
    }
}
