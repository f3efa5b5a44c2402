// src/batch/mod.rs

//! Batch driver: finds documents on disk, runs each through read, assemble and store,
//! and collects one [`ProcessingResult`] per file. A failing document never stops the
//! batch.

use crate::documents::models::{ConflictPolicy, DocumentKind, Judgment, LegalDocument};
use crate::documents::{assemble_fatwa, assemble_judgment, assemble_law, extract_raw_text, Assembly};
use crate::documents::reader::SUPPORTED_EXTENSIONS;
use crate::extractors::debug_patterns;
use crate::storage::StorageManager;
use crate::utils::error::AppError;
use crate::utils::text_debug::save_debug_text;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Settings for a directory batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Base directory holding `fatwas/`, `laws/` and `judgments/`.
    pub input_dir: PathBuf,
    pub kinds: Vec<DocumentKind>,
    pub concurrency: usize,
    /// When set, annotated normalized text is written under `<debug_dir>/<kind>/`.
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Inserted,
    Duplicate,
    Skipped,
    Error,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStatus::Inserted => "INSERTED",
            ProcessingStatus::Duplicate => "DUPLICATE",
            ProcessingStatus::Skipped => "SKIPPED",
            ProcessingStatus::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Outcome for one document file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub file: String,
    pub kind: DocumentKind,
    pub status: ProcessingStatus,
    /// Store id (`<number>_<year>`) for inserted and duplicate documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(results: &[ProcessingResult]) -> Self {
        results.iter().fold(Summary::default(), |mut summary, result| {
            summary.total += 1;
            match result.status {
                ProcessingStatus::Inserted => summary.inserted += 1,
                ProcessingStatus::Duplicate => summary.duplicates += 1,
                ProcessingStatus::Skipped => summary.skipped += 1,
                ProcessingStatus::Error => summary.errors += 1,
            }
            summary
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divider = "=".repeat(60);
        writeln!(f, "{}", divider)?;
        writeln!(f, "PROCESSING SUMMARY")?;
        writeln!(f, "{}", divider)?;
        writeln!(f, "Total Processed: {}", self.total)?;
        writeln!(f, "Inserted:        {}", self.inserted)?;
        writeln!(f, "Duplicates:      {}", self.duplicates)?;
        writeln!(f, "Skipped:         {}", self.skipped)?;
        writeln!(f, "Errors:          {}", self.errors)?;
        write!(f, "{}", divider)
    }
}

/// Where the batch sends its progress events.
pub trait Reporter: Send + Sync {
    fn directory_scanned(&self, kind: DocumentKind, dir: &Path, files: usize);
    fn directory_missing(&self, kind: DocumentKind, dir: &Path);
    fn document_processed(&self, result: &ProcessingResult);
    /// Non-fatal trouble with a document, such as a failed debug dump.
    fn warning(&self, file: &str, message: &str);
}

/// Reports through `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn directory_scanned(&self, kind: DocumentKind, dir: &Path, files: usize) {
        tracing::info!(%kind, dir = %dir.display(), "Found {} file(s)", files);
    }

    fn directory_missing(&self, kind: DocumentKind, dir: &Path) {
        tracing::warn!(%kind, "Directory not found: {}", dir.display());
    }

    fn document_processed(&self, result: &ProcessingResult) {
        let (file, kind, status) = (&result.file, result.kind, result.status);
        match status {
            ProcessingStatus::Inserted | ProcessingStatus::Duplicate => {
                tracing::info!(%file, %kind, %status, "{}", result.message)
            }
            ProcessingStatus::Skipped => {
                tracing::warn!(%file, %kind, %status, "{}", result.message)
            }
            ProcessingStatus::Error => {
                tracing::error!(%file, %kind, %status, "{}", result.message)
            }
        }
    }

    fn warning(&self, file: &str, message: &str) {
        tracing::warn!(%file, "{}", message);
    }
}

/// Supported document files directly inside `dir`, sorted by file name.
///
/// Office lock files (`~$...`) are ignored.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("~$") {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if supported {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Runs every document of the configured kinds found under `config.input_dir`.
///
/// Kinds are visited in the order given; a missing kind directory is reported and
/// contributes no results.
pub async fn run_batch(
    config: &BatchConfig,
    store: Arc<StorageManager>,
    reporter: Arc<dyn Reporter>,
) -> Result<Vec<ProcessingResult>, AppError> {
    let mut jobs = Vec::new();

    for &kind in &config.kinds {
        let dir = config.input_dir.join(kind.dir_name());
        if !dir.is_dir() {
            reporter.directory_missing(kind, &dir);
            continue;
        }
        let files = discover_files(&dir)?;
        reporter.directory_scanned(kind, &dir, files.len());
        jobs.extend(files.into_iter().map(|path| (kind, path)));
    }

    process_all(jobs, config.concurrency, config.debug_dir.clone(), store, reporter).await
}

/// Processes the given documents on blocking workers, at most `concurrency` at a time.
///
/// Results come back in the order of `jobs`, whatever order the workers finish in.
pub async fn process_all(
    jobs: Vec<(DocumentKind, PathBuf)>,
    concurrency: usize,
    debug_dir: Option<PathBuf>,
    store: Arc<StorageManager>,
    reporter: Arc<dyn Reporter>,
) -> Result<Vec<ProcessingResult>, AppError> {
    if concurrency == 0 {
        return Err(AppError::Config("Concurrency must be at least 1".to_string()));
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(jobs.len());

    for (kind, path) in jobs {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| AppError::Processing(format!("Worker pool closed: {}", e)))?;

        let file = file_label(&path);
        let store = Arc::clone(&store);
        let reporter = Arc::clone(&reporter);
        let debug_dir = debug_dir.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let result = process_file(kind, &path, &store, debug_dir.as_deref(), reporter.as_ref());
            drop(permit);
            result
        });
        handles.push((kind, file, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (kind, file, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => ProcessingResult {
                file,
                kind,
                status: ProcessingStatus::Error,
                id: None,
                message: format!("Worker task failed: {}", e),
            },
        };
        reporter.document_processed(&result);
        results.push(result);
    }

    Ok(results)
}

/// Reads, assembles and stores one document.
pub fn process_file(
    kind: DocumentKind,
    path: &Path,
    store: &StorageManager,
    debug_dir: Option<&Path>,
    reporter: &dyn Reporter,
) -> ProcessingResult {
    let file = file_label(path);

    let (status, id, message) = match run_pipeline(kind, path, store, debug_dir, reporter, &file) {
        Ok(outcome) => outcome,
        Err(e) => (ProcessingStatus::Error, None, e.to_string()),
    };

    ProcessingResult { file, kind, status, id, message }
}

type Outcome = (ProcessingStatus, Option<String>, String);

fn run_pipeline(
    kind: DocumentKind,
    path: &Path,
    store: &StorageManager,
    debug_dir: Option<&Path>,
    reporter: &dyn Reporter,
    file: &str,
) -> Result<Outcome, AppError> {
    let raw = extract_raw_text(path)?;
    let debug = |text: &str| {
        if let Some(dir) = debug_dir {
            let target = dir.join(kind.dir_name()).join(format!("{}.txt", file));
            if let Err(e) = save_debug_text(text, &target, &debug_patterns(kind)) {
                reporter.warning(file, &format!("Failed to write debug text: {}", e));
            }
        }
    };

    match kind {
        DocumentKind::Fatwa => {
            let fatwa = assemble_fatwa(&raw)?;
            debug(fatwa.record().full_text());
            store_assembly(fatwa, store)
        }
        DocumentKind::Law => {
            let law = assemble_law(&raw)?;
            debug(law.record().full_text());
            store_assembly(law, store)
        }
        DocumentKind::Judgment => {
            let judgment: Assembly<Judgment> = assemble_judgment(&raw)?;
            debug(judgment.record().full_text());
            if judgment.record().header.case_identity().is_none() {
                let reason = "Missing case number/year".to_string();
                return Ok((ProcessingStatus::Skipped, None, reason));
            }
            store_assembly(judgment, store)
        }
    }
}

fn store_assembly<D: LegalDocument>(
    assembly: Assembly<D>,
    store: &StorageManager,
) -> Result<Outcome, AppError> {
    let record = match assembly {
        Assembly::Assembled(record) => record,
        Assembly::Rejected { reason, .. } => {
            return Ok((ProcessingStatus::Skipped, None, reason.to_string()));
        }
    };

    let outcome = store.upsert(&record)?;
    // Assembled records always carry a key; upsert has already checked it.
    let key = record
        .natural_key()
        .map(|k| k.to_string())
        .unwrap_or_else(|| outcome.id.clone());

    if outcome.is_new_insert {
        let message = format!("Inserted {} {}", D::KIND, key);
        Ok((ProcessingStatus::Inserted, Some(outcome.id), message))
    } else {
        let action = match D::KIND.on_conflict() {
            ConflictPolicy::KeepExisting => "kept existing record",
            ConflictPolicy::Replace => "updated existing record",
        };
        let message = format!("{} {} already exists, {}", D::KIND, key, action);
        Ok((ProcessingStatus::Duplicate, Some(outcome.id), message))
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    summary: Summary,
    results: &'a [ProcessingResult],
}

/// Writes all results and their summary as pretty JSON.
pub fn write_report(path: &Path, results: &[ProcessingResult]) -> Result<(), AppError> {
    let report = Report {
        generated_at: chrono::Utc::now().to_rfc3339(),
        summary: Summary::from_results(results),
        results,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::Processing(format!("Failed to serialize report: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const FATWA: &str = "مجلس الدولة - الفتوى رقم 55 لسنة 2020 بتاريخ 2020-03-01 تاريخ الجلسة 2020-02-15\n\
مبدأ 1\n\
لا يجوز الجمع بين وظيفتين.\n\
الرأى\n\
عدم جواز الجمع.";

    const LAW: &str = "قانون رقم 6 لسنة 2022\nبشأن تنظيم ما\nالمادة 1\nيعمل به.";

    const JUDGMENT: &str = "جمهورية مصر العربية - محكمة النقض - مدني\n\
الطعن رقم 1784 لسنة 54\n\
الوقائع\n\
سرد\n\
الحيثيات\n\
حيث إن\n\
لما تقدم يتعين رفض الطعن.";

    #[derive(Default)]
    struct RecordingReporter {
        processed: Mutex<Vec<String>>,
        missing: Mutex<Vec<DocumentKind>>,
    }

    impl Reporter for RecordingReporter {
        fn directory_scanned(&self, _kind: DocumentKind, _dir: &Path, _files: usize) {}

        fn directory_missing(&self, kind: DocumentKind, _dir: &Path) {
            self.missing.lock().unwrap().push(kind);
        }

        fn document_processed(&self, result: &ProcessingResult) {
            self.processed.lock().unwrap().push(result.file.clone());
        }

        fn warning(&self, _file: &str, _message: &str) {}
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("legal_extractor_batch_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_discover_skips_lock_and_unsupported_files() {
        let dir = scratch_dir("discover");
        write(&dir, "b.txt", "x");
        write(&dir, "a.docx", "x");
        write(&dir, "~$a.docx", "x");
        write(&dir, "notes.pdf", "x");
        fs::create_dir_all(dir.join("nested.txt")).unwrap();

        let names: Vec<String> =
            discover_files(&dir).unwrap().iter().map(|p| file_label(p)).collect();
        assert_eq!(names, vec!["a.docx", "b.txt"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_process_file_statuses() {
        let dir = scratch_dir("statuses");
        let store = StorageManager::new(dir.join("store")).unwrap();
        let reporter = RecordingReporter::default();

        let fatwa = write(&dir, "fatwa.txt", FATWA);
        let first = process_file(DocumentKind::Fatwa, &fatwa, &store, None, &reporter);
        assert_eq!(first.status, ProcessingStatus::Inserted, "{}", first.message);
        assert_eq!(first.id.as_deref(), Some("55_2020"));

        let again = process_file(DocumentKind::Fatwa, &fatwa, &store, None, &reporter);
        assert_eq!(again.status, ProcessingStatus::Duplicate);

        let headless = write(&dir, "headless.txt", "نص بلا رأس");
        let skipped = process_file(DocumentKind::Law, &headless, &store, None, &reporter);
        assert_eq!(skipped.status, ProcessingStatus::Skipped);
        assert_eq!(skipped.message, "Missing header");

        let no_case = write(&dir, "no_case.txt", "محكمة النقض\nلما تقدم رفض.");
        let soft_skip = process_file(DocumentKind::Judgment, &no_case, &store, None, &reporter);
        assert_eq!(soft_skip.status, ProcessingStatus::Skipped);
        assert_eq!(soft_skip.message, "Missing case number/year");

        let unreadable = write(&dir, "scan.pdf", "%PDF");
        let error = process_file(DocumentKind::Law, &unreadable, &store, None, &reporter);
        assert_eq!(error.status, ProcessingStatus::Error);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_debug_dump_written() {
        let dir = scratch_dir("debug");
        let store = StorageManager::new(dir.join("store")).unwrap();
        let law = write(&dir, "law.txt", LAW);

        let debug_dir = dir.join("debug");
        let result = process_file(
            DocumentKind::Law,
            &law,
            &store,
            Some(debug_dir.as_path()),
            &TracingReporter,
        );
        assert_eq!(result.status, ProcessingStatus::Inserted);

        let dump = fs::read_to_string(dir.join("debug").join("laws").join("law.txt.txt")).unwrap();
        assert!(dump.contains("⟦item⟧المادة 1⟦/item⟧"), "Unexpected dump: {}", dump);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_run_batch_keeps_discovery_order() {
        let dir = scratch_dir("run");
        let input = dir.join("samples");
        write(&input.join("fatwas"), "1.txt", FATWA);
        write(&input.join("fatwas"), "2.txt", FATWA);
        write(&input.join("judgments"), "a.txt", JUDGMENT);
        write(&input.join("judgments"), "b.txt", "لا شيء هنا");

        let config = BatchConfig {
            input_dir: input,
            kinds: DocumentKind::ALL.to_vec(),
            concurrency: 2,
            debug_dir: None,
        };
        let store = Arc::new(StorageManager::new(dir.join("store")).unwrap());
        let reporter = Arc::new(RecordingReporter::default());

        let results = tokio_test::block_on(run_batch(&config, store, reporter.clone())).unwrap();

        let files: Vec<&str> = results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["1.txt", "2.txt", "a.txt", "b.txt"]);
        assert_eq!(*reporter.processed.lock().unwrap(), vec!["1.txt", "2.txt", "a.txt", "b.txt"]);
        assert_eq!(*reporter.missing.lock().unwrap(), vec![DocumentKind::Law]);

        let summary = Summary::from_results(&results);
        assert_eq!(
            summary,
            Summary { total: 4, inserted: 2, duplicates: 1, skipped: 1, errors: 0 }
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_concurrency_is_config_error() {
        let store = Arc::new(StorageManager::new(scratch_dir("zero")).unwrap());
        let reporter = Arc::new(TracingReporter);
        let result = tokio_test::block_on(process_all(Vec::new(), 0, None, store, reporter));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_write_report() {
        let dir = scratch_dir("report");
        let results = vec![ProcessingResult {
            file: "x.docx".to_string(),
            kind: DocumentKind::Law,
            status: ProcessingStatus::Error,
            id: None,
            message: "boom".to_string(),
        }];
        let path = dir.join("out").join("report.json");
        write_report(&path, &results).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["summary"]["errors"], 1);
        assert_eq!(report["results"][0]["status"], "error");
        assert_eq!(report["results"][0]["kind"], "law");
        assert!(report["generated_at"].is_string());

        let _ = fs::remove_dir_all(&dir);
    }
}
