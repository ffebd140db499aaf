//! # Style Extract CLI (`stylex`)
//!
//! The `stylex` binary runs the extraction pipeline on a code or writing
//! corpus and writes the generated style guide.
//!
//! ## Usage
//!
//! ```bash
//! stylex --config ./config/stylex.toml <command> <code|writing>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stylex scan <kind>` | List the samples that would be sent, with their size |
//! | `stylex prompt <kind>` | Print the assembled prompt without calling the model |
//! | `stylex extract <kind>` | Run the full pipeline and save the draft |
//!
//! ## Examples
//!
//! ```bash
//! # Coding guide from ./code_samples/*.py
//! # (ANTHROPIC_API_KEY from the environment or a ./.env file)
//! ANTHROPIC_API_KEY=... stylex extract code
//!
//! # Writing guide from a notes directory, at most 10 files
//! stylex extract writing --root ~/notes --max-files 10 --output guide.md
//!
//! # Inspect the prompt for a Rust corpus
//! stylex prompt code --root ./src --ext .rs --language Rust
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use style_extract::client::create_provider;
use style_extract::config::{self, Config, ModelConfig};
use style_extract::extract::{self, CorpusOptions};
use style_extract::models::CorpusKind;
use style_extract::progress::{format_number, ProgressMode};
use style_extract::prompt::prompt_digest;
use style_extract::scan::CapPolicy;

/// Style Extract: derive a prescriptive style guide from sample files.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "stylex",
    about = "Style Extract: derive a prescriptive coding or writing style guide from sample files",
    version,
    long_about = "Style Extract scans a corpus of code or writing samples, embeds them in a prompt \
    that separates style from subject matter, asks a language model for a style guide in a single \
    request, and saves the markdown reply."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/stylex.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/stylex.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` on a terminal, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List the samples a run would use.
    ///
    /// Scans and loads the corpus, then prints each sample's path and size
    /// (lines for code, words for writing). Never calls the model.
    Scan {
        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Print the assembled prompt.
    ///
    /// Runs scan, load and assembly and writes the prompt to stdout. Its
    /// SHA-256 digest goes to stderr so two runs can be compared.
    Prompt {
        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Generate a style guide.
    ///
    /// Runs the full pipeline and writes the model's reply to the output
    /// path. Nothing is written if any stage fails.
    Extract {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output file; its directory is created if needed.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the model identifier.
        #[arg(long)]
        model: Option<String>,

        /// Override the maximum number of output tokens.
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Override the request timeout in seconds (0 = no timeout).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

/// Corpus selection shared by all commands.
#[derive(Args)]
struct CorpusArgs {
    /// Corpus kind: `code` (line counts, fenced blocks) or `writing` (word counts).
    #[arg(value_enum)]
    kind: CorpusKind,

    /// Corpus root directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// File extension to include (repeatable), e.g. `--ext .md --ext .txt`.
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Maximum number of sample files.
    #[arg(long)]
    max_files: Option<usize>,

    /// How `--max-files` applies across several extensions.
    #[arg(long, value_enum)]
    cap: Option<CapPolicy>,

    /// Source language name used in the code prompt (e.g. `Rust`).
    #[arg(long)]
    language: Option<String>,
}

impl CorpusArgs {
    fn resolve(&self, cfg: &Config) -> CorpusOptions {
        let mut options = CorpusOptions::from_config(cfg, self.kind);
        if let Some(root) = &self.root {
            options.root = root.clone();
        }
        if !self.extensions.is_empty() {
            options.extensions = self.extensions.clone();
        }
        if let Some(max_files) = self.max_files {
            options.max_files = max_files;
        }
        if let Some(cap) = self.cap {
            options.cap = cap;
        }
        if let Some(language) = &self.language {
            options.language = language.clone();
        }
        options
    }
}

fn main() -> Result<()> {
    // A `.env` file may supply the API key; real environment variables win.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let reporter = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Scan { corpus } => {
            let options = corpus.resolve(&cfg);
            let samples = extract::collect_samples(&options, reporter.as_ref())?;
            let unit = options.kind.metric_unit();

            println!("{:<56} {:>10}", "SAMPLE", unit.to_uppercase());
            for sample in &samples {
                println!(
                    "{:<56} {:>10}",
                    sample.relative_path,
                    format_number(sample.size_metric() as u64)
                );
            }
            let total: usize = samples.iter().map(|s| s.size_metric()).sum();
            println!(
                "{} samples, {} {}",
                samples.len(),
                format_number(total as u64),
                unit
            );
        }
        Commands::Prompt { corpus } => {
            let options = corpus.resolve(&cfg);
            let prepared = extract::prepare_prompt(&options, reporter.as_ref())?;
            println!("{}", prepared.prompt);
            eprintln!("sha256: {}", prompt_digest(&prepared.prompt));
        }
        Commands::Extract {
            corpus,
            output,
            model,
            max_tokens,
            timeout_secs,
        } => {
            let options = corpus.resolve(&cfg);
            let output = output.unwrap_or_else(|| cfg.corpus.get(options.kind).output.clone());
            let model_cfg = ModelConfig {
                name: model.unwrap_or_else(|| cfg.model.name.clone()),
                max_tokens: max_tokens.unwrap_or(cfg.model.max_tokens),
                timeout_secs: timeout_secs.unwrap_or(cfg.model.timeout_secs),
                ..cfg.model.clone()
            };
            if model_cfg.max_tokens == 0 {
                anyhow::bail!("--max-tokens must be > 0");
            }

            // Local stages first: a bad corpus must fail before any credential
            // lookup or network call.
            let prepared = extract::prepare_prompt(&options, reporter.as_ref())?;
            let provider = create_provider(&model_cfg)?;
            let run = extract::complete_run(
                &prepared,
                &output,
                provider.as_ref(),
                reporter.as_ref(),
            )?;

            println!("extract {}", options.kind);
            println!("  samples: {}", prepared.sample_count);
            println!("  model: {}", provider.model_name());
            if let Some(result) = run.current() {
                println!("  input tokens: {}", format_number(result.input_tokens));
                println!("  output tokens: {}", format_number(result.output_tokens));
            }
            println!("  output: {}", output.display());
            println!("ok");
        }
    }

    Ok(())
}
