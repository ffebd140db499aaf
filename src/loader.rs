//! Sample loader.
//!
//! Reads scanned files into [`Sample`] records. Unreadable files (missing,
//! permission denied, not valid UTF-8) are reported and skipped; they never
//! abort the batch.

use anyhow::{Context, Result};
use std::path::{Component, Path};

use crate::models::{CorpusKind, Sample};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Load `paths` in order, skipping any file that cannot be read as UTF-8.
pub fn load_samples(
    paths: &[impl AsRef<Path>],
    root: &Path,
    kind: CorpusKind,
    reporter: &dyn ProgressReporter,
) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(paths.len());
    let mut total_metric = 0usize;

    for path in paths {
        let path = path.as_ref();
        let relative_path = relative_path(path, root);

        match read_utf8(path) {
            Ok(content) => {
                let sample = Sample::new(kind, relative_path, content);
                total_metric += sample.size_metric();
                reporter.report(ProgressEvent::SampleRead {
                    kind,
                    path: sample.relative_path.clone(),
                    metric: sample.size_metric(),
                });
                samples.push(sample);
            }
            Err(e) => {
                reporter.report(ProgressEvent::SampleSkipped {
                    path: relative_path,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    reporter.report(ProgressEvent::Loaded {
        kind,
        files: samples.len(),
        total_metric,
    });

    samples
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).context("file is not valid UTF-8")
}

/// Path of `path` relative to `root`, joined with `/` on every platform.
///
/// Paths outside `root` keep their full form.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        skipped: RefCell<Vec<String>>,
    }

    impl ProgressReporter for Recorder {
        fn report(&self, event: ProgressEvent) {
            if let ProgressEvent::SampleSkipped { path, .. } = event {
                self.skipped.borrow_mut().push(path);
            }
        }
    }

    #[test]
    fn loads_in_order_with_metrics() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("one.py"), "a\nb\n").unwrap();
        fs::write(root.join("nested/two.py"), "x = 1\n").unwrap();
        fs::write(root.join("empty.py"), "").unwrap();

        let paths = vec![
            root.join("nested/two.py"),
            root.join("one.py"),
            root.join("empty.py"),
        ];
        let samples = load_samples(&paths, root, CorpusKind::Code, &NoProgress);

        let rels: Vec<&str> = samples.iter().map(|s| s.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["nested/two.py", "one.py", "empty.py"]);
        let metrics: Vec<usize> = samples.iter().map(|s| s.size_metric()).collect();
        assert_eq!(metrics, vec![1, 2, 0]);
        assert_eq!(samples[2].content, "");
    }

    #[test]
    fn skips_invalid_utf8_and_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let mut paths: Vec<PathBuf> = Vec::new();
        for i in 0..5 {
            let p = root.join(format!("f{}.md", i));
            if i == 1 || i == 3 {
                fs::write(&p, [0xff, 0xfe, 0x00, 0x9f]).unwrap();
            } else {
                fs::write(&p, format!("word{} more words", i)).unwrap();
            }
            paths.push(p);
        }

        let recorder = Recorder::default();
        let samples = load_samples(&paths, root, CorpusKind::Writing, &recorder);

        let rels: Vec<&str> = samples.iter().map(|s| s.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["f0.md", "f2.md", "f4.md"]);
        assert!(samples.iter().all(|s| s.size_metric() == 3));
        assert_eq!(*recorder.skipped.borrow(), vec!["f1.md", "f3.md"]);
    }

    #[test]
    fn skips_missing_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("kept.txt"), "kept").unwrap();
        let paths = vec![root.join("gone.txt"), root.join("kept.txt")];

        let samples = load_samples(&paths, root, CorpusKind::Writing, &NoProgress);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].relative_path, "kept.txt");
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("corpus");
        let path = root.join("a").join("b").join("c.py");
        assert_eq!(relative_path(&path, root), "a/b/c.py");
    }
}
