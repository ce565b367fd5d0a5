use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ignore_rules::{IgnoreRuleset, InclusionFilter};

/// One file discovered under a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root-relative path with forward-slash separators.
    pub relative_path: String,
    /// Full file content, lossily decoded as UTF-8.
    pub content: String,
}

/// Enumerates files under `root` depth-first in directory order.
///
/// Ignored entries are skipped entirely; an ignored directory is never
/// descended into. The inclusion filter applies to leaf files only. An
/// empty result is not an error; an unreadable root is.
pub fn walk_repository(
    root: &Path,
    ruleset: &IgnoreRuleset,
    filter: &InclusionFilter,
) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    walk_directory(root, root, ruleset, filter, &mut records)?;
    Ok(records)
}

fn walk_directory(
    root: &Path,
    dir: &Path,
    ruleset: &IgnoreRuleset,
    filter: &InclusionFilter,
    records: &mut Vec<FileRecord>,
) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to enumerate entry in {}", dir.display()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("entry {} escapes the walk root", path.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;

        if ruleset.is_ignored(relative, file_type.is_dir()) {
            continue;
        }
        if file_type.is_dir() {
            walk_directory(root, &path, ruleset, filter, records)?;
            continue;
        }

        let relative_text = forward_slashes(&relative.to_string_lossy());
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let absolute_text = forward_slashes(&path.to_string_lossy());
        if !filter.matches(&relative_text, &file_name, &absolute_text) {
            continue;
        }

        let bytes =
            fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        records.push(FileRecord {
            relative_path: relative_text,
            content: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(())
}

fn forward_slashes(text: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        text.to_string()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::walk_repository;
    use crate::ignore_rules::{IgnoreRuleset, InclusionFilter};

    fn write_fixture(root: &std::path::Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, content).expect("write fixture");
    }

    #[test]
    fn unit_walk_repository_returns_empty_for_empty_root() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let records = walk_repository(
            tempdir.path(),
            &IgnoreRuleset::empty(),
            &InclusionFilter::default(),
        )
        .expect("walk");
        assert!(records.is_empty());
    }

    #[test]
    fn functional_walk_repository_recurses_and_uses_forward_slashes() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        write_fixture(tempdir.path(), "a/b/c.txt", "nested");
        let records = walk_repository(
            tempdir.path(),
            &IgnoreRuleset::empty(),
            &InclusionFilter::default(),
        )
        .expect("walk");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].relative_path, "a/b/c.txt");
        assert_eq!(records[0].content, "nested");
    }

    #[test]
    fn functional_walk_repository_applies_inclusion_to_files_only() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        write_fixture(tempdir.path(), "src/App.tsx", "app");
        write_fixture(tempdir.path(), "src/Other.tsx", "other");
        let filter = InclusionFilter::from_entries(["app.tsx"]);
        let records =
            walk_repository(tempdir.path(), &IgnoreRuleset::empty(), &filter).expect("walk");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].relative_path, "src/App.tsx");
    }

    #[test]
    fn regression_walk_repository_skips_ignored_files_before_inclusion() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        write_fixture(tempdir.path(), ".gitignore", "*.secret\n");
        write_fixture(tempdir.path(), "keys.secret", "hidden");
        let ruleset = IgnoreRuleset::load(tempdir.path()).expect("ruleset");
        let filter = InclusionFilter::from_entries(["keys.secret"]);
        let records = walk_repository(tempdir.path(), &ruleset, &filter).expect("walk");
        assert!(records.is_empty());
    }

    #[test]
    fn regression_walk_repository_errors_on_unreadable_root() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let missing = tempdir.path().join("does-not-exist");
        let error = walk_repository(
            &missing,
            &IgnoreRuleset::empty(),
            &InclusionFilter::default(),
        )
        .expect_err("missing root");
        assert!(error.to_string().contains("failed to read directory"));
    }
}
