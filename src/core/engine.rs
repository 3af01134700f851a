use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{DocgenError, Result};
use super::extractor::DeclarationExtractor;
use super::model::ParsedDeclaration;
use super::parser::{ParsedSource, SourceParser};
use super::renderer::Renderer;
use super::type_index::{SharedTypeIndex, TypeReferenceIndex};
use super::writer::{delete_generated, OutputWriter};

/// A source file whose processing failed
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a full generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Files extracted, rendered and written without error
    pub files_processed: usize,
    pub declarations: usize,
    pub documents_written: usize,
    /// Previously generated files removed by the pre-pass
    pub stale_removed: usize,
    pub failures: Vec<FileFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, path: &Path, err: DocgenError) {
        error!("Failed to process {}: {}", path.display(), err);
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            error: err.to_string(),
        });
    }
}

/// Main orchestration engine: parse, extract, render, write
pub struct Engine {
    config: Config,
    extractor: DeclarationExtractor,
    renderer: Renderer,
}

impl Engine {
    /// Create an engine from a config file, or the default config
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let renderer = Renderer::new(&config.templates)?;
        Ok(Self {
            config,
            extractor: DeclarationExtractor::new(),
            renderer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Expand files and directories into a sorted list of absolute source paths.
    ///
    /// Directories are walked honouring `.gitignore` and `project.ignore_patterns`.
    pub fn discover_sources(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();

        for input in inputs {
            if input.is_file() {
                if self.has_source_extension(input) {
                    sources.push(absolute(input));
                } else {
                    warn!("Skipping {}: not a recognised source file", input.display());
                }
                continue;
            }
            if !input.is_dir() {
                warn!("Skipping {}: no such file or directory", input.display());
                continue;
            }

            let mut overrides = OverrideBuilder::new(input);
            for pattern in &self.config.project.ignore_patterns {
                overrides
                    .add(&format!("!{}", pattern))
                    .map_err(|e| DocgenError::Config(format!("invalid ignore pattern `{}`: {}", pattern, e)))?;
            }
            let overrides = overrides.build().map_err(|e| DocgenError::Config(e.to_string()))?;

            let walker = WalkBuilder::new(input)
                .hidden(false)
                .git_ignore(true)
                .overrides(overrides)
                .build();

            for entry in walker {
                let entry = entry.map_err(|e| DocgenError::FileSystem(e.to_string()))?;
                let path = entry.path();
                if path.is_file() && self.has_source_extension(path) {
                    sources.push(absolute(path));
                }
            }
        }

        sources.sort();
        sources.dedup();
        debug!("Discovered {} source files", sources.len());
        Ok(sources)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.parsing.file_extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Read and parse one source file
    pub fn parse_file(&self, file: &Path) -> Result<ParsedSource> {
        let content = std::fs::read_to_string(file).map_err(|e| DocgenError::fs("read", file, e))?;

        if content.len() > self.config.parsing.max_file_size {
            return Err(DocgenError::Parse {
                path: file.to_path_buf(),
                line: 0,
                message: format!(
                    "file exceeds maximum size of {} bytes",
                    self.config.parsing.max_file_size
                ),
            });
        }

        let mut parser = SourceParser::new(&self.config.project.source_root)?;
        parser.parse(file, content)
    }

    /// Parse and extract one file, registering its declarations in `index`
    pub fn extract_file(&self, file: &Path, index: &mut TypeReferenceIndex) -> Result<Vec<ParsedDeclaration>> {
        let parsed = self.parse_file(file)?;
        Ok(self.extractor.extract(&parsed, index))
    }

    /// Full run over `files` into `output`.
    ///
    /// Deletes stale generated output first, extracts every file so the index
    /// is complete, then renders and writes file by file. A failing file is
    /// recorded in the report and does not stop the others.
    pub fn generate(&self, files: &[PathBuf], output: &Path, index: &mut TypeReferenceIndex) -> Result<GenerationReport> {
        info!("🔍 Generating reference docs for {} source files", files.len());
        info!("Output: {}", output.display());

        let mut report = GenerationReport {
            stale_removed: delete_generated(output)?,
            ..Default::default()
        };

        let mut extracted = Vec::new();
        for file in files {
            match self.extract_file(file, index) {
                Ok(declarations) => {
                    debug!("{}: {} documented declarations", file.display(), declarations.len());
                    report.declarations += declarations.len();
                    extracted.push((file, declarations));
                }
                Err(e) => report.record_failure(file, e),
            }
        }

        let generated_at = Utc::now();
        let mut writer = OutputWriter::new(output, &self.config.output);
        for (file, declarations) in extracted {
            match self.write_declarations(&declarations, index, &mut writer, generated_at) {
                Ok(written) => {
                    report.files_processed += 1;
                    report.documents_written += written;
                }
                Err(e) => report.record_failure(file, e),
            }
        }

        info!(
            "✅ Wrote {} documents from {} files ({} failed, {} stale files removed)",
            report.documents_written,
            report.files_processed,
            report.failures.len(),
            report.stale_removed
        );
        Ok(report)
    }

    /// Single-file pass used by watch mode. Index entries from earlier runs stay valid.
    pub fn regenerate_file(&self, file: &Path, output: &Path, index: &SharedTypeIndex) -> Result<usize> {
        let parsed = self.parse_file(file)?;
        let declarations = self.extractor.extract(&parsed, &mut index.write());
        let snapshot = index.snapshot();

        let mut writer = OutputWriter::new(output, &self.config.output);
        self.write_declarations(&declarations, &snapshot, &mut writer, Utc::now())
    }

    fn write_declarations(
        &self,
        declarations: &[ParsedDeclaration],
        index: &TypeReferenceIndex,
        writer: &mut OutputWriter,
        generated_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut written = 0;
        for declaration in declarations {
            let info = &declaration.info;
            let content = self.renderer.render(declaration, index, generated_at)?;
            writer.write(&info.category, &info.file_name, &content, || {
                self.renderer.render_category_index(&info.category, generated_at)
            })?;
            written += 1;
        }
        Ok(written)
    }

    /// Poll every file and regenerate it when its modification time changes.
    ///
    /// Runs until Ctrl-C. Each distinct file is owned by exactly one polling
    /// task, and that task awaits a pass before its next tick, so passes for the
    /// same file never overlap. Passes for different files may run concurrently
    /// and meet only at the shared index.
    pub async fn watch(self: Arc<Self>, files: Vec<PathBuf>, output: PathBuf, index: SharedTypeIndex) -> Result<()> {
        let interval = Duration::from_millis(self.config.watch.poll_interval_ms);
        let mut tasks = JoinSet::new();

        for file in watch_targets(files) {
            tasks.spawn(Arc::clone(&self).poll_file(file, output.clone(), index.clone(), interval));
        }

        info!("👀 Watching {} files (polling every {:?})", tasks.len(), interval);

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Stopping watch"),
            _ = async { while tasks.join_next().await.is_some() {} } => {}
        }

        tasks.abort_all();
        Ok(())
    }

    async fn poll_file(
        self: Arc<Self>,
        file: PathBuf,
        output: PathBuf,
        index: SharedTypeIndex,
        interval: Duration,
    ) {
        let mut last_seen = modified_time(&file);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let current = modified_time(&file);
            if current == last_seen {
                continue;
            }
            last_seen = current;
            if current.is_none() {
                warn!("{} is no longer readable", file.display());
                continue;
            }

            info!("♻️  {} changed, regenerating", file.display());

            let engine = Arc::clone(&self);
            let (task_file, task_output, task_index) = (file.clone(), output.clone(), index.clone());
            let result = tokio::task::spawn_blocking(move || {
                engine.regenerate_file(&task_file, &task_output, &task_index)
            })
            .await;

            match result {
                Ok(Ok(written)) => info!("✅ Regenerated {} documents from {}", written, file.display()),
                Ok(Err(e)) => error!("Failed to regenerate {}: {}", file.display(), e),
                Err(e) => error!("Regeneration of {} aborted: {}", file.display(), e),
            }
        }
    }
}

/// Distinct files in first-seen order, one polling task each
fn watch_targets(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|file| seen.insert(absolute(file)))
        .collect()
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Group declarations by category, each group ordered by weight then title
pub fn category_listing(declarations: &[ParsedDeclaration]) -> BTreeMap<&str, Vec<&ParsedDeclaration>> {
    let mut listing: BTreeMap<&str, Vec<&ParsedDeclaration>> = BTreeMap::new();
    for declaration in declarations {
        listing
            .entry(declaration.info.category.as_str())
            .or_default()
            .push(declaration);
    }
    for group in listing.values_mut() {
        group.sort_by(|a, b| {
            a.info
                .weight
                .cmp(&b.info.weight)
                .then_with(|| a.info.title.cmp(&b.info.title))
        });
    }
    listing
}
