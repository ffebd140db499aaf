use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::models::CorpusKind;
use crate::scan::CapPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub corpus: CorporaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds. `0` waits indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            name: default_model_name(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model_name() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_max_tokens() -> u32 {
    8000
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorporaConfig {
    #[serde(default = "CorpusConfig::code", deserialize_with = "code_corpus")]
    pub code: CorpusConfig,
    #[serde(default = "CorpusConfig::writing", deserialize_with = "writing_corpus")]
    pub writing: CorpusConfig,
}

impl Default for CorporaConfig {
    fn default() -> Self {
        Self {
            code: CorpusConfig::code(),
            writing: CorpusConfig::writing(),
        }
    }
}

impl CorporaConfig {
    pub fn get(&self, kind: CorpusKind) -> &CorpusConfig {
        match kind {
            CorpusKind::Code => &self.code,
            CorpusKind::Writing => &self.writing,
        }
    }
}

/// Settings for one corpus kind, with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub max_files: usize,
    pub cap: CapPolicy,
    /// Source language named in the code prompt; unused for writing.
    pub language: String,
    pub output: PathBuf,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

impl CorpusConfig {
    /// Built-in settings for `kind`.
    pub fn defaults(kind: CorpusKind) -> Self {
        let (root, extensions, language, output): (&str, &[&str], &str, &str) = match kind {
            CorpusKind::Code => (
                "code_samples",
                &[".py"],
                "Python",
                "skill_set/coding_stylistic_guide.md",
            ),
            CorpusKind::Writing => (
                "writing_samples",
                &[".md", ".txt"],
                "",
                "skill_set/writing_stylistic_guide.md",
            ),
        };
        Self {
            root: PathBuf::from(root),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            max_files: 20,
            cap: CapPolicy::Global,
            language: language.to_string(),
            output: PathBuf::from(output),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }

    pub fn code() -> Self {
        Self::defaults(CorpusKind::Code)
    }

    pub fn writing() -> Self {
        Self::defaults(CorpusKind::Writing)
    }
}

/// A `[corpus.code]` or `[corpus.writing]` table as written. Keys left out
/// take the kind's value from [`CorpusConfig::defaults`].
#[derive(Debug, Deserialize)]
struct CorpusTable {
    root: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    max_files: Option<usize>,
    cap: Option<CapPolicy>,
    language: Option<String>,
    output: Option<PathBuf>,
    #[serde(default)]
    exclude_globs: Vec<String>,
    #[serde(default)]
    follow_symlinks: bool,
}

impl CorpusTable {
    fn resolve(self, kind: CorpusKind) -> CorpusConfig {
        let defaults = CorpusConfig::defaults(kind);
        CorpusConfig {
            root: self.root.unwrap_or(defaults.root),
            extensions: self.extensions.unwrap_or(defaults.extensions),
            max_files: self.max_files.unwrap_or(defaults.max_files),
            cap: self.cap.unwrap_or(defaults.cap),
            language: self.language.unwrap_or(defaults.language),
            output: self.output.unwrap_or(defaults.output),
            exclude_globs: self.exclude_globs,
            follow_symlinks: self.follow_symlinks,
        }
    }
}

fn code_corpus<'de, D>(deserializer: D) -> std::result::Result<CorpusConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(CorpusTable::deserialize(deserializer)?.resolve(CorpusKind::Code))
}

fn writing_corpus<'de, D>(deserializer: D) -> std::result::Result<CorpusConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(CorpusTable::deserialize(deserializer)?.resolve(CorpusKind::Writing))
}

impl Config {
    /// Built-in defaults, used when no configuration file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load and validate a configuration file.
///
/// A missing file is not an error: the built-in defaults are returned so the
/// tool works out of the box in a directory laid out like the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Check invariants that serde cannot express.
pub fn validate(config: &Config) -> Result<()> {
    if config.model.max_tokens == 0 {
        anyhow::bail!("model.max_tokens must be > 0");
    }

    if config.model.name.trim().is_empty() {
        anyhow::bail!("model.name must not be empty");
    }

    match config.model.provider.as_str() {
        "anthropic" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be anthropic or disabled.",
            other
        ),
    }

    for kind in [CorpusKind::Code, CorpusKind::Writing] {
        let corpus = config.corpus.get(kind);
        if corpus.extensions.is_empty() {
            anyhow::bail!("corpus.{}.extensions must not be empty", kind);
        }
        if corpus.extensions.iter().any(|e| e.is_empty()) {
            anyhow::bail!("corpus.{}.extensions must not contain empty entries", kind);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.model.name, "claude-sonnet-4-20250514");
        assert_eq!(config.model.max_tokens, 8000);
        assert_eq!(config.corpus.code.extensions, [".py"]);
        assert_eq!(config.corpus.writing.extensions, [".md", ".txt"]);
        assert_eq!(config.corpus.code.max_files, 20);
        assert_eq!(
            config.corpus.writing.output,
            Path::new("skill_set/writing_stylistic_guide.md")
        );
        assert_eq!(config.corpus.code.cap, CapPolicy::Global);
    }

    #[test]
    fn partial_corpus_table_keeps_kind_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stylex.toml");
        std::fs::write(
            &path,
            r#"
[model]
max_tokens = 4000

[corpus.code]
root = "samples"
cap = "per-extension"
language = "Rust"
extensions = [".rs"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model.max_tokens, 4000);
        assert_eq!(config.model.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.corpus.code.root, Path::new("samples"));
        assert_eq!(config.corpus.code.extensions, [".rs"]);
        assert_eq!(config.corpus.code.cap, CapPolicy::PerExtension);
        assert_eq!(config.corpus.code.language, "Rust");
        assert_eq!(
            config.corpus.code.output,
            Path::new("skill_set/coding_stylistic_guide.md")
        );
        assert_eq!(config.corpus.writing.root, Path::new("writing_samples"));
    }

    #[test]
    fn empty_tables_match_builtin_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stylex.toml");
        std::fs::write(&path, "[corpus.code]\n\n[corpus.writing]\n").unwrap();

        let config = load_config(&path).unwrap();
        let minimal = Config::minimal();
        assert_eq!(config.corpus.code, minimal.corpus.code);
        assert_eq!(config.corpus.writing, minimal.corpus.writing);
        assert_eq!(config.corpus.code, CorpusConfig::defaults(CorpusKind::Code));
        assert_eq!(config.corpus.code.language, "Python");
        assert_eq!(config.corpus.writing.root, Path::new("writing_samples"));
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stylex.toml");
        std::fs::write(&path, "[model]\nmax_tokens = 0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn rejects_empty_extensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stylex.toml");
        std::fs::write(&path, "[corpus.writing]\nextensions = []\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("corpus.writing.extensions"));
    }

    #[test]
    fn rejects_unknown_provider() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stylex.toml");
        std::fs::write(&path, "[model]\nprovider = \"carrier-pigeon\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
