//! Locating build files under a project directory.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Find the first file under `root` whose name ends with `suffix`.
///
/// The comparison is case-insensitive and the walk visits entries in name
/// order, so the result is deterministic for a given tree. Entries whose
/// names start with a dot are skipped entirely, including their subtrees.
pub fn find_build_file(root: &Path, suffix: &str) -> Option<PathBuf> {
    let suffix = suffix.to_lowercase();
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .ends_with(&suffix)
        })
        .map(DirEntry::into_path)
}

fn is_hidden(entry: &DirEntry) -> bool {
    // Depth zero is the walk root itself, which the caller chose.
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
