//! Extraction pipeline orchestration.
//!
//! Coordinates one run: scan → load → assemble prompt → call the model →
//! save the draft. The pipeline is linear and stops at the first fatal
//! error; only unreadable sample files are skipped. No output file is
//! written unless the model call succeeded.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::client::{CompletionProvider, CompletionRequest};
use crate::config::Config;
use crate::draft::write_draft;
use crate::loader::load_samples;
use crate::models::{CorpusKind, ExtractionResult, Sample};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::prompt::assemble_prompt;
use crate::scan::{scan_corpus, CapPolicy, ScanOptions};
use crate::session::Session;

/// Resolved corpus settings for one run (config plus CLI overrides).
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    pub kind: CorpusKind,
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub max_files: usize,
    pub cap: CapPolicy,
    pub language: String,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

impl CorpusOptions {
    pub fn from_config(config: &Config, kind: CorpusKind) -> Self {
        let corpus = config.corpus.get(kind);
        Self {
            kind,
            root: corpus.root.clone(),
            extensions: corpus.extensions.clone(),
            max_files: corpus.max_files,
            cap: corpus.cap,
            language: corpus.language.clone(),
            exclude_globs: corpus.exclude_globs.clone(),
            follow_symlinks: corpus.follow_symlinks,
        }
    }

    fn scan_options(&self) -> ScanOptions<'_> {
        ScanOptions {
            extensions: &self.extensions,
            max_files: self.max_files,
            cap: self.cap,
            exclude_globs: &self.exclude_globs,
            follow_symlinks: self.follow_symlinks,
        }
    }
}

/// Scan the corpus, failing if nothing matches.
pub fn discover_files(
    options: &CorpusOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>> {
    let files = scan_corpus(&options.root, &options.scan_options())?;
    reporter.report(ProgressEvent::Scanned {
        kind: options.kind,
        count: files.len(),
    });

    if files.is_empty() {
        bail!(
            "No {} sample files matching {} found in {}",
            options.kind,
            options.extensions.join(", "),
            options.root.display()
        );
    }
    Ok(files)
}

/// Scan and load the corpus, failing if no sample could be read.
pub fn collect_samples(
    options: &CorpusOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Sample>> {
    let files = discover_files(options, reporter)?;
    let samples = load_samples(&files, &options.root, options.kind, reporter);

    if samples.is_empty() {
        bail!(
            "No {} samples could be read from the {} files found in {}",
            options.kind,
            files.len(),
            options.root.display()
        );
    }
    Ok(samples)
}

/// An assembled prompt, ready to be sent.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub kind: CorpusKind,
    pub sample_count: usize,
    pub prompt: String,
}

/// Run the local stages of the pipeline: scan, load, and assemble.
pub fn prepare_prompt(
    options: &CorpusOptions,
    reporter: &dyn ProgressReporter,
) -> Result<PreparedPrompt> {
    let samples = collect_samples(options, reporter)?;
    let prompt = assemble_prompt(&samples, options.kind, &options.language);
    Ok(PreparedPrompt {
        kind: options.kind,
        sample_count: samples.len(),
        prompt,
    })
}

/// State owned by one pipeline run: the conversation log and current draft.
#[derive(Debug)]
pub struct ExtractionRun {
    kind: CorpusKind,
    session: Session,
    current: Option<ExtractionResult>,
}

impl ExtractionRun {
    pub fn new(kind: CorpusKind) -> Self {
        Self {
            kind,
            session: Session::new(),
            current: None,
        }
    }

    /// Send `prompt` (after any earlier turns) and keep the reply as the
    /// current draft.
    ///
    /// On success the prompt and reply are appended to the session. On
    /// failure nothing is recorded and the current draft is unchanged.
    pub fn extract(
        &mut self,
        provider: &dyn CompletionProvider,
        prompt: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<&ExtractionResult> {
        let request = CompletionRequest {
            model: provider.model_name().to_string(),
            max_tokens: provider.max_tokens(),
            messages: self.session.request_messages(prompt),
        };

        reporter.report(ProgressEvent::Requesting {
            kind: self.kind,
            model: request.model.clone(),
        });

        let response = provider.complete(&request).context("extraction failed")?;

        self.session
            .record_exchange(prompt, &response.content)
            .context("extraction failed")?;

        reporter.report(ProgressEvent::Usage {
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        });

        Ok(&*self.current.insert(ExtractionResult {
            draft_text: response.content,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        }))
    }

    /// Write the current draft to `path`.
    pub fn save(&self, path: &Path, reporter: &dyn ProgressReporter) -> Result<()> {
        let Some(result) = &self.current else {
            bail!("No draft to save: extraction has not completed");
        };
        write_draft(path, &result.draft_text)?;
        reporter.report(ProgressEvent::Saved {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    pub fn kind(&self) -> CorpusKind {
        self.kind
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current(&self) -> Option<&ExtractionResult> {
        self.current.as_ref()
    }
}

/// Send a prepared prompt and save the draft to `output`.
pub fn complete_run(
    prepared: &PreparedPrompt,
    output: &Path,
    provider: &dyn CompletionProvider,
    reporter: &dyn ProgressReporter,
) -> Result<ExtractionRun> {
    let mut run = ExtractionRun::new(prepared.kind);
    run.extract(provider, &prepared.prompt, reporter)?;
    run.save(output, reporter)?;
    Ok(run)
}

/// Full pipeline: scan, load, assemble, extract, save.
pub fn run_extract(
    options: &CorpusOptions,
    output: &Path,
    provider: &dyn CompletionProvider,
    reporter: &dyn ProgressReporter,
) -> Result<ExtractionRun> {
    let prepared = prepare_prompt(options, reporter)?;
    complete_run(&prepared, output, provider, reporter)
}
