use std::path::Path;

use rustyline::completion::Pair;
use walkdir::WalkDir;

const MAX_ENTRIES: usize = 5000;

/// Every file below a directory, as paths relative to it.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    paths: Vec<String>,
}

impl FileIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn scan(root: &Path) -> Self {
        let mut paths: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(root)
                    .ok()
                    .map(|relative| relative.to_string_lossy().into_owned())
            })
            .take(MAX_ENTRIES)
            .collect();

        paths.sort();
        Self { paths }
    }

    /// Case-insensitive prefix matches for the word under the cursor.
    pub fn complete(&self, word: &str) -> Vec<Pair> {
        let needle = word.to_lowercase();

        self.paths
            .iter()
            .filter(|path| path.to_lowercase().starts_with(&needle))
            .map(|path| Pair {
                display: path.clone(),
                replacement: path.clone(),
            })
            .collect()
    }
}
