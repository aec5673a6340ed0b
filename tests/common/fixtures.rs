// Test fixtures for integration testing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway wiki directory plus a data directory for its index
pub struct TestWiki {
    pub dir: TempDir,
    pub data: TempDir,
}

impl TestWiki {
    /// A small wiki with metadata on most pages
    #[allow(dead_code)] // Used in integration tests
    pub fn small() -> Self {
        Self::with_files(&[
            (
                "index.md",
                "# Welcome\n\nStart here. Links to the [runbooks](ops/runbook.md).",
            ),
            (
                "ops/runbook.md",
                "topic: ops\nauthor: Ann Lee\nkeyword: pager\n\n# Runbook\n\nRestart the cache when eviction stalls.",
            ),
            (
                "ops/cache.md",
                "topic: ops\ntag: cache\nauthor: Bob\n\nCache Layer\n===========\n\nThe shared cache uses LRU eviction.",
            ),
            (
                "dev/build.md",
                "category: dev\nmaintainer: Bob\n\n# Build\n\nCompiler flags and **release** profiles.",
            ),
            (
                "hr/salaries.md",
                "topic: secret\n\n# Salaries\n\nNot for the search index.",
            ),
            ("notes.txt", "plain text is not a page"),
        ])
    }

    /// Create with custom files
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let wiki = Self {
            dir: TempDir::new().unwrap(),
            data: TempDir::new().unwrap(),
        };
        for (path, content) in files {
            wiki.write(path, content);
        }
        wiki
    }

    /// Write (or overwrite) a page
    #[allow(dead_code)] // Used in integration tests
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        std::fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Remove a page
    #[allow(dead_code)] // Used in integration tests
    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Get path to the wiki root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the index for this wiki lives
    pub fn index_path(&self) -> PathBuf {
        self.data.path().join("index")
    }
}

/// UTF-8 test data for page parsing and indexing
#[allow(dead_code)] // Used in integration tests
pub struct Utf8TestData {
    pub emoji: Vec<&'static str>,
    pub multibyte: Vec<&'static str>,
}

impl Utf8TestData {
    #[allow(dead_code)] // Used in integration tests
    pub fn new() -> Self {
        Self {
            emoji: vec![
                "Hello 👋 World",
                "Rust 🦀 is awesome",
                "🚀 Launch time",
                "Warning ⚠️",
                "Celebrate 🎉🎊🥳",
            ],
            multibyte: vec![
                "中文测试",
                "مرحبا بالعالم",
                "Привет мир",
                "こんにちは世界",
                "Γειά σου κόσμε",
            ],
        }
    }
}
