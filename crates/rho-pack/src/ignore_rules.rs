use std::path::Path;

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

const IGNORE_FILE_NAME: &str = ".gitignore";

/// Gitignore-style exclusion rules loaded once per walk.
///
/// A root without an ignore file yields an empty ruleset; nothing is
/// excluded beyond what the inclusion filter rejects.
pub struct IgnoreRuleset {
    matcher: Option<Gitignore>,
}

impl IgnoreRuleset {
    /// Loads the ignore file at `root` when present. Absence is not an
    /// error; a present but unparseable file is.
    pub fn load(root: &Path) -> Result<Self> {
        let ignore_path = root.join(IGNORE_FILE_NAME);
        if !ignore_path.exists() {
            return Ok(Self::empty());
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(error) = builder.add(&ignore_path) {
            return Err(error)
                .with_context(|| format!("failed to parse {}", ignore_path.display()));
        }
        let matcher = builder
            .build()
            .with_context(|| format!("failed to compile {}", ignore_path.display()))?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    pub fn empty() -> Self {
        Self { matcher: None }
    }

    /// Returns true when the root-relative path is excluded by the rules.
    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.matched(relative, is_dir).is_ignore(),
            None => false,
        }
    }
}

/// Optional allow-list restricting which discovered files are retained.
///
/// An empty filter passes everything. Entries and candidate paths are
/// compared case-insensitively with separators normalized to `/`.
#[derive(Debug, Clone, Default)]
pub struct InclusionFilter {
    entries: Vec<String>,
}

fn normalize_path_text(raw: &str) -> String {
    raw.trim().replace('\\', "/").to_lowercase()
}

impl InclusionFilter {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| normalize_path_text(entry.as_ref()))
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the filter is empty, or any entry equals the file's
    /// root-relative path, its base name, or its absolute path. The three
    /// representations are equivalent membership tests; any match suffices.
    pub fn matches(&self, relative: &str, file_name: &str, absolute: &str) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let relative = normalize_path_text(relative);
        let file_name = normalize_path_text(file_name);
        let absolute = normalize_path_text(absolute);
        self.entries
            .iter()
            .any(|entry| *entry == relative || *entry == file_name || *entry == absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::{IgnoreRuleset, InclusionFilter};
    use std::path::Path;

    #[test]
    fn unit_ignore_ruleset_is_empty_without_ignore_file() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let ruleset = IgnoreRuleset::load(tempdir.path()).expect("load");
        assert!(!ruleset.is_ignored(Path::new("anything.rs"), false));
    }

    #[test]
    fn functional_ignore_ruleset_matches_patterns_for_files_and_directories() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        std::fs::write(tempdir.path().join(".gitignore"), "target/\n*.log\n").expect("write");
        let ruleset = IgnoreRuleset::load(tempdir.path()).expect("load");
        assert!(ruleset.is_ignored(Path::new("target"), true));
        assert!(ruleset.is_ignored(Path::new("debug.log"), false));
        assert!(!ruleset.is_ignored(Path::new("src"), true));
    }

    #[test]
    fn unit_inclusion_filter_passes_everything_when_empty() {
        let filter = InclusionFilter::default();
        assert!(filter.matches("src/App.tsx", "App.tsx", "/r/src/App.tsx"));
    }

    #[test]
    fn functional_inclusion_filter_accepts_each_path_representation() {
        for entry in ["src/App.tsx", "APP.TSX", "/r/src/App.tsx"] {
            let filter = InclusionFilter::from_entries([entry]);
            assert!(
                filter.matches("src/App.tsx", "App.tsx", "/r/src/App.tsx"),
                "entry '{entry}' should include the file"
            );
        }
    }

    #[test]
    fn functional_inclusion_filter_excludes_non_matching_entries() {
        let filter = InclusionFilter::from_entries(["Other.tsx"]);
        assert!(!filter.matches("src/App.tsx", "App.tsx", "/r/src/App.tsx"));
    }

    #[test]
    fn regression_inclusion_filter_normalizes_backslash_separators() {
        let filter = InclusionFilter::from_entries(["src\\App.tsx"]);
        assert!(filter.matches("src/App.tsx", "App.tsx", "/r/src/App.tsx"));
    }

    #[test]
    fn unit_inclusion_filter_drops_blank_entries() {
        let filter = InclusionFilter::from_entries(["  ", ""]);
        assert!(filter.is_empty());
    }
}
