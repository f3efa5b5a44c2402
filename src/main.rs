// src/main.rs
use clap::{Parser, ValueEnum};
use legal_extractor::batch::{self, BatchConfig, Reporter, Summary, TracingReporter};
use legal_extractor::documents::DocumentKind;
use legal_extractor::storage::StorageManager;
use legal_extractor::utils::{self, AppError};
use std::path::PathBuf;
use std::sync::Arc;

/// Which document families to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TypeFilter {
    Fatwa,
    Law,
    Judgment,
    All,
}

impl TypeFilter {
    fn kinds(self) -> Vec<DocumentKind> {
        match self {
            TypeFilter::Fatwa => vec![DocumentKind::Fatwa],
            TypeFilter::Law => vec![DocumentKind::Law],
            TypeFilter::Judgment => vec![DocumentKind::Judgment],
            TypeFilter::All => DocumentKind::ALL.to_vec(),
        }
    }
}

/// Legal documents parser and loader for fatwas, laws and judgments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document type to process
    #[arg(short = 't', long = "type", value_enum, default_value_t = TypeFilter::All)]
    doc_type: TypeFilter,

    /// Process a single file (requires a concrete --type)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Base directory holding fatwas/, laws/ and judgments/
    #[arg(short, long, default_value = "./samples")]
    dir: PathBuf,

    /// Output directory for stored records
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Number of documents processed in parallel (default: available CPUs)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Debug mode - save annotated normalized text for every document
    #[arg(long)]
    debug: bool,

    /// Write a JSON report of all results to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let concurrency = match args.concurrency {
        Some(0) => return Err(AppError::Config("--concurrency must be at least 1".to_string())),
        Some(n) => n,
        None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };
    let debug_dir = args.debug.then(|| args.output_dir.join("debug"));

    // 3. Initialize storage
    let store = Arc::new(StorageManager::new(&args.output_dir)?);
    tracing::info!("Storing records under {}", store.base_dir().display());
    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);

    // 4. Single file or whole directory
    let results = if let Some(file) = &args.file {
        let kind = match args.doc_type {
            TypeFilter::Fatwa => DocumentKind::Fatwa,
            TypeFilter::Law => DocumentKind::Law,
            TypeFilter::Judgment => DocumentKind::Judgment,
            TypeFilter::All => {
                return Err(AppError::Config(
                    "Please specify --type (fatwa, law, judgment) when using --file".to_string(),
                ))
            }
        };
        tracing::info!("Mode: single file {} ({})", file.display(), kind);
        batch::process_all(vec![(kind, file.clone())], 1, debug_dir, store, reporter).await?
    } else {
        let config = BatchConfig {
            input_dir: args.dir.clone(),
            kinds: args.doc_type.kinds(),
            concurrency,
            debug_dir,
        };
        tracing::info!(
            "Mode: batch over {} with {} worker(s)",
            config.input_dir.display(),
            concurrency
        );
        batch::run_batch(&config, store, reporter).await?
    };

    // 5. Report
    let summary = Summary::from_results(&results);
    println!("{}", summary);

    if summary.errors > 0 {
        println!("\nERRORS:");
        for result in results.iter().filter(|r| r.status == batch::ProcessingStatus::Error) {
            println!("  - {}: {}", result.file, result.message);
        }
    }

    if let Some(path) = &args.report {
        batch::write_report(path, &results)?;
        tracing::info!("Saved report to {}", path.display());
    }

    tracing::info!(
        "Processing finished. Inserted: {}, Duplicates: {}, Skipped: {}, Errors: {}",
        summary.inserted,
        summary.duplicates,
        summary.skipped,
        summary.errors
    );

    if summary.errors > 0 {
        return Err(AppError::Processing(format!(
            "{} of {} document(s) failed",
            summary.errors, summary.total
        )));
    }

    Ok(())
}
