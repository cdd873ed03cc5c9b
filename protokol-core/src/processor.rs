use crate::config::ParsingConfig;
use crate::preprocessors::{DocxPreprocessor, Preprocessor};
use crate::records::RowFlattener;
use crate::rules::RuleEngine;
use crate::types::*;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Collects timings for pipeline steps, summed across documents
pub struct StepProfiler {
    enabled: bool,
    /// (step, total time, times recorded), in first-seen order
    timings: Vec<(String, Duration, usize)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        self.record(step_name, start.elapsed());
        result
    }

    pub fn record(&mut self, step_name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        match self.timings.iter_mut().find(|(name, _, _)| name == step_name) {
            Some((_, total, count)) => {
                *total += elapsed;
                *count += 1;
            }
            None => self.timings.push((step_name.to_string(), elapsed, 1)),
        }
    }

    pub fn record_all(&mut self, timings: &[(String, Duration)]) {
        for (step, elapsed) in timings {
            self.record(step, *elapsed);
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, Duration, usize)> {
        self.timings
            .iter()
            .map(|(name, total, count)| (name.as_str(), *total, *count))
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d, _)| *d).sum();

        for (step, duration, count) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%, {}x)",
                step,
                duration.as_millis(),
                percentage,
                count
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Everything derived from one input document
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub file_name: String,
    pub record: ProtocolRecord,
    pub rows: Vec<OutputRow>,
    /// Per-step timings for this document, in execution order
    pub timings: Vec<(String, Duration)>,
}

/// A document that could not be opened or read; the batch carried on without it
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchOutput {
    /// Successfully processed documents, in file-name order
    pub documents: Vec<ProcessedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutput {
    /// All rows, documents concatenated in order
    pub fn rows(&self) -> Vec<OutputRow> {
        self.documents
            .iter()
            .flat_map(|doc| doc.rows.iter().cloned())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.rows.len()).sum()
    }
}

pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    rule_engine: RuleEngine,
    flattener: RowFlattener,
}

impl DocumentProcessor {
    /// DOCX input with the given rule configuration
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        Self::new_with_dependencies(Box::new(DocxPreprocessor::new()), config)
    }

    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        preprocessor: Box<dyn Preprocessor>,
        config: &ParsingConfig,
    ) -> Result<Self> {
        let rule_engine =
            RuleEngine::new(config).context("invalid label configuration")?;

        Ok(Self {
            preprocessor,
            rule_engine,
            flattener: RowFlattener::from_config(config),
        })
    }

    /// Extraction and flattening only; no I/O and no failure modes
    pub fn process_source(&self, file_name: &str, document: &SourceDocument) -> ProcessedDocument {
        let (record, mut timings) = self.rule_engine.extract_timed(document);

        let flatten_start = Instant::now();
        let rows = self.flattener.flatten(file_name, &record);
        timings.push(("Flatten".to_string(), flatten_start.elapsed()));

        ProcessedDocument {
            file_name: file_name.to_string(),
            record,
            rows,
            timings,
        }
    }

    pub fn process_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ProcessedDocument> {
        let mut timings = Vec::new();

        let markup_start = Instant::now();
        let markup = self.preprocessor.parse_document_to_markup(bytes)?;
        timings.push((
            format!("{} → Markup", self.preprocessor.name()),
            markup_start.elapsed(),
        ));

        let source_start = Instant::now();
        let document = self.preprocessor.parse_markup_to_source(&markup)?;
        timings.push(("Markup → SourceDocument".to_string(), source_start.elapsed()));

        let mut processed = self.process_source(file_name, &document);
        timings.append(&mut processed.timings);
        processed.timings = timings;
        Ok(processed)
    }

    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument> {
        if !self.preprocessor.supports_file_type(path) {
            anyhow::bail!(
                "{} preprocessor does not support {}",
                self.preprocessor.name(),
                path.display()
            );
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let processed = self
            .process_bytes(&file_name, &bytes)
            .with_context(|| format!("failed to process {}", path.display()))?;

        info!(
            "📄 {}: {} agenda items × {} members → {} rows",
            file_name,
            processed.record.agenda.len(),
            processed.record.roll_call.len(),
            processed.rows.len()
        );
        Ok(processed)
    }

    /// Supported documents directly inside `dir` (no recursion), sorted by file name
    pub fn discover_documents(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to list {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && self.preprocessor.supports_file_type(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!("🔍 Found {} documents in {}", paths.len(), dir.display());
        Ok(paths)
    }

    fn process_all(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<ProcessedDocument>)> {
        #[cfg(feature = "parallel")]
        {
            paths
                .par_iter()
                .map(|path| (path.clone(), self.process_file(path)))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            paths
                .iter()
                .map(|path| (path.clone(), self.process_file(path)))
                .collect()
        }
    }

    /// Process the given files in order. A file that fails is logged, recorded
    /// and skipped.
    pub fn process_paths(&self, paths: &[PathBuf], profiler: &mut StepProfiler) -> BatchOutput {
        let mut batch = BatchOutput::default();

        for (path, result) in self.process_all(paths) {
            match result {
                Ok(document) => {
                    profiler.record_all(&document.timings);
                    batch.documents.push(document);
                }
                Err(error) => {
                    warn!("⚠️  Skipping {}: {:#}", path.display(), error);
                    batch.failures.push(DocumentFailure {
                        path,
                        error: format!("{error:#}"),
                    });
                }
            }
        }

        batch
    }

    pub fn process_directory(&self, dir: &Path) -> Result<BatchOutput> {
        self.process_directory_with_profiler(dir, &mut StepProfiler::new(false))
    }

    pub fn process_directory_with_profiler(
        &self,
        dir: &Path,
        profiler: &mut StepProfiler,
    ) -> Result<BatchOutput> {
        let paths = profiler.time_step("Discovery", || self.discover_documents(dir))?;
        info!("📁 Processing {} documents from {}", paths.len(), dir.display());
        Ok(self.process_paths(&paths, profiler))
    }
}
