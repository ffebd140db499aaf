//! Pipeline progress reporting.
//!
//! Reports what the pipeline is doing (files found, samples read or skipped,
//! the model request, token usage, the saved draft) so users can follow a
//! run. Progress is emitted on **stderr** so stdout stays parseable; the
//! `prompt` command in particular prints the assembled prompt on stdout.
//!
//! The API key never appears in any event.

use std::io::Write;
use std::path::PathBuf;

use crate::models::CorpusKind;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Scanner finished; `count` candidate files were found.
    Scanned { kind: CorpusKind, count: usize },
    /// One sample was read. `metric` is lines or words depending on `kind`.
    SampleRead {
        kind: CorpusKind,
        path: String,
        metric: usize,
    },
    /// A file could not be read and was left out of the batch.
    SampleSkipped { path: String, error: String },
    /// Loader finished.
    Loaded {
        kind: CorpusKind,
        files: usize,
        total_metric: usize,
    },
    /// The extraction request is about to be sent.
    Requesting { kind: CorpusKind, model: String },
    /// Token usage reported by the endpoint.
    Usage {
        input_tokens: u64,
        output_tokens: u64,
    },
    /// The draft was written to disk.
    Saved { path: PathBuf },
}

/// Receives progress events. Implementations write to stderr (human or JSON).
pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "read 1,234 lines from src/app.py".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Scanned { kind, count } => {
                format!("scan {}  found {} files\n", kind, format_number(*count as u64))
            }
            ProgressEvent::SampleRead { kind, path, metric } => format!(
                "read {} {} from {}\n",
                format_number(*metric as u64),
                kind.metric_unit(),
                path
            ),
            ProgressEvent::SampleSkipped { path, error } => {
                format!("warning: skipped {}: {}\n", path, error)
            }
            ProgressEvent::Loaded {
                kind,
                files,
                total_metric,
            } => format!(
                "total: {} {} read from {} files\n",
                format_number(*total_metric as u64),
                kind.metric_unit(),
                format_number(*files as u64)
            ),
            ProgressEvent::Requesting { kind, model } => {
                format!("extract {}  analyzing samples with {}...\n", kind, model)
            }
            ProgressEvent::Usage {
                input_tokens,
                output_tokens,
            } => format!(
                "  input tokens: {}\n  output tokens: {}\n",
                format_number(*input_tokens),
                format_number(*output_tokens)
            ),
            ProgressEvent::Saved { path } => format!("saved draft to {}\n", path.display()),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = event_json(&event);
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn event_json(event: &ProgressEvent) -> serde_json::Value {
    match event {
        ProgressEvent::Scanned { kind, count } => serde_json::json!({
            "event": "scanned",
            "kind": kind,
            "count": count
        }),
        ProgressEvent::SampleRead { kind, path, metric } => serde_json::json!({
            "event": "sample_read",
            "kind": kind,
            "path": path,
            (kind.metric_unit()): metric
        }),
        ProgressEvent::SampleSkipped { path, error } => serde_json::json!({
            "event": "sample_skipped",
            "path": path,
            "error": error
        }),
        ProgressEvent::Loaded {
            kind,
            files,
            total_metric,
        } => serde_json::json!({
            "event": "loaded",
            "kind": kind,
            "files": files,
            (kind.metric_unit()): total_metric
        }),
        ProgressEvent::Requesting { kind, model } => serde_json::json!({
            "event": "requesting",
            "kind": kind,
            "model": model
        }),
        ProgressEvent::Usage {
            input_tokens,
            output_tokens,
        } => serde_json::json!({
            "event": "usage",
            "input_tokens": input_tokens,
            "output_tokens": output_tokens
        }),
        ProgressEvent::Saved { path } => serde_json::json!({
            "event": "saved",
            "path": path.display().to_string()
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Format an integer with comma thousands separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
