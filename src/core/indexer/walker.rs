//! File system walker with extension filtering.
//!
//! Traverses a watched root and yields the page files beneath it.
//! Handles errors gracefully (permission denied, etc.) without
//! aborting the walk. Also maps file paths onto the URI space the
//! wiki serves them under.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use walkdir::{DirEntry, WalkDir};

/// File system walker for one page extension
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// Suffix a file name must end with (e.g. ".md")
    extension: String,
}

impl FileWalker {
    /// Create a new file walker for files ending in `extension`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Collect all page files below `root`
    ///
    /// Hidden directories are skipped. Walk errors are logged and
    /// the traversal continues. Results are sorted so crawls are
    /// reproducible.
    pub fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| should_process_entry(e, root))
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        files
    }

    /// Check whether a path carries the page extension
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|f| f.to_str())
            .map(|f| f.len() > self.extension.len() && f.ends_with(&self.extension))
            .unwrap_or(false)
    }

    /// Check whether a crawl of `root` would pick up `path`
    ///
    /// Live events run through this so the watcher and the crawl
    /// agree on which files are pages.
    pub fn accepts(&self, root: &Path, path: &Path) -> bool {
        self.matches(path) && !hidden_below(root, path.parent().unwrap_or(root))
    }

    /// Check whether a crawl of `root` would descend into `dir`
    pub fn accepts_dir(&self, root: &Path, dir: &Path) -> bool {
        !hidden_below(root, dir)
    }
}

/// True when a directory between `root` and `dir` is hidden, or
/// `dir` is not below `root` at all
fn hidden_below(root: &Path, dir: &Path) -> bool {
    match dir.strip_prefix(root) {
        Ok(relative) => relative.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .map_or(true, |name| name.starts_with('.'))
        }),
        Err(_) => true,
    }
}

/// Never filters the root itself; skips hidden directories below it
fn should_process_entry(entry: &DirEntry, root: &Path) -> bool {
    let path = entry.path();

    if path == root {
        return true;
    }

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if name.starts_with('.') && entry.file_type().is_dir() {
            return false;
        }
    }

    true
}

/// Map a file path to the URI it is served under
///
/// The root is removed from the front of the path and the URI
/// prefix put in its place. A doubled `/` at the join is collapsed.
///
/// ```
/// use gnosis::core::indexer::uri_path;
/// use std::path::Path;
///
/// assert_eq!(
///     uri_path(Path::new("/wiki/page.md"), Path::new("/wiki/"), "/var/www/"),
///     "/var/www/page.md"
/// );
/// ```
pub fn uri_path(file: &Path, root: &Path, prefix: &str) -> String {
    let file = file.to_string_lossy();
    let root = root.to_string_lossy();

    let relative = file.strip_prefix(root.as_ref()).unwrap_or(&file);
    let relative = if MAIN_SEPARATOR == '/' {
        relative.to_string()
    } else {
        relative.replace(MAIN_SEPARATOR, "/")
    };

    if prefix.ends_with('/') && relative.starts_with('/') {
        format!("{prefix}{}", &relative[1..])
    } else if !prefix.is_empty()
        && !prefix.ends_with('/')
        && !relative.is_empty()
        && !relative.starts_with('/')
        && root.ends_with(['/', MAIN_SEPARATOR])
    {
        format!("{prefix}/{relative}")
    } else {
        format!("{prefix}{relative}")
    }
}
