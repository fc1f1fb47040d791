//! File locations derived from the task file path.
//!
//! The task file is a single JSON document, e.g. `~/.todomanager/tasks.json`. Its backup and
//! its advisory lock live next to it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<file>` with `suffix` appended to the full file name, so `tasks.json` becomes
/// `tasks.json.lock` rather than `tasks.lock`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("tasks.json"));
    name.push(suffix);
    path.with_file_name(name)
}

/// Path of the advisory lock file for `task_file`.
///
/// Nothing in the library creates or honours it; collaborators agree on the convention.
pub fn lock_path(task_file: &Path) -> PathBuf {
    sibling(task_file, ".lock")
}

/// Where the previous contents go before the task file is overwritten.
pub fn backup_path(task_file: &Path) -> PathBuf {
    sibling(task_file, ".backup")
}

/// Temporary file used for the write-then-rename.
pub(crate) fn temp_path(task_file: &Path) -> PathBuf {
    sibling(task_file, ".tmp")
}

/// `$HOME/.todomanager/tasks.json`, or `./.todomanager/tasks.json` without a home.
pub fn default_task_file() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".todomanager").join("tasks.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_keep_the_extension() {
        let p = Path::new("/data/todo/tasks.json");
        assert_eq!(lock_path(p), PathBuf::from("/data/todo/tasks.json.lock"));
        assert_eq!(backup_path(p), PathBuf::from("/data/todo/tasks.json.backup"));
        assert_eq!(temp_path(p), PathBuf::from("/data/todo/tasks.json.tmp"));
    }

    #[test]
    fn relative_paths_stay_relative() {
        assert_eq!(lock_path(Path::new("list.json")), PathBuf::from("list.json.lock"));
    }

    #[test]
    fn default_file_is_under_dot_dir() {
        let p = default_task_file();
        assert!(p.ends_with(".todomanager/tasks.json"));
    }
}
