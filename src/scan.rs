//! Corpus scanner.
//!
//! Walks the corpus root once and returns the files matching the configured
//! extensions in a stable order, bounded by `max_files`.
//!
//! Symlinked files are returned like regular files. Links that cannot be
//! resolved are returned too, so the loader reports them as skipped samples
//! instead of the whole scan failing.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const PRUNED_DIRS: &[&str] = &[".git", "target", "node_modules"];

/// How `max_files` applies when several extensions are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CapPolicy {
    /// At most `max_files` results across all extensions combined.
    Global,
    /// At most `max_files` results for each extension.
    PerExtension,
}

/// Inputs of one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions<'a> {
    pub extensions: &'a [String],
    pub max_files: usize,
    pub cap: CapPolicy,
    pub exclude_globs: &'a [String],
    pub follow_symlinks: bool,
}

/// Discover candidate sample files under `root`.
///
/// Results are grouped by extension, in the given extension order. Within
/// one extension files keep the walk order: depth-first with entries sorted
/// by file name, so the result only depends on the directory contents. A
/// file matched by more than one extension is returned once, at its first
/// position.
pub fn scan_corpus(root: &Path, options: &ScanOptions<'_>) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Corpus root is not a directory: {}", root.display());
    }
    if options.extensions.is_empty() {
        bail!("At least one file extension is required to scan a corpus");
    }
    if options.extensions.iter().any(|ext| ext.is_empty()) {
        bail!("File extensions must not be empty");
    }

    let exclude_set = build_globset(options.exclude_globs)?;
    let candidates = walk_candidates(root, options, &exclude_set)?;

    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for ext in options.extensions {
        let mut matched_for_ext = 0usize;
        for (name, path) in &candidates {
            if cap_reached(options, files.len(), matched_for_ext) {
                break;
            }
            if !name.ends_with(ext.as_str()) || !seen.insert(path) {
                continue;
            }
            files.push(path.clone());
            matched_for_ext += 1;
        }
    }

    Ok(files)
}

/// Every file under `root` whose name ends with one of the extensions, in
/// walk order, paired with its file name.
fn walk_candidates(
    root: &Path,
    options: &ScanOptions<'_>,
    exclude_set: &GlobSet,
) -> Result<Vec<(String, PathBuf)>> {
    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned_dir(entry));

    let mut candidates = Vec::new();
    for entry in walker {
        let path = match entry {
            Ok(entry) => {
                let link_to_file = entry.path_is_symlink() && !entry.path().is_dir();
                if !entry.file_type().is_file() && !link_to_file {
                    continue;
                }
                entry.into_path()
            }
            // Dangling link; the loader reports it.
            Err(err) => {
                let unresolved = err.path().filter(|p| !p.is_dir()).map(Path::to_path_buf);
                match unresolved {
                    Some(path) => path,
                    None => return Err(err.into()),
                }
            }
        };

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        if !options.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        if exclude_set.is_match(relative) {
            continue;
        }

        candidates.push((name, path));
    }

    Ok(candidates)
}

fn is_pruned_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| PRUNED_DIRS.contains(&name))
}

fn cap_reached(options: &ScanOptions<'_>, total: usize, for_ext: usize) -> bool {
    match options.cap {
        CapPolicy::Global => total >= options.max_files,
        CapPolicy::PerExtension => for_ext >= options.max_files,
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
