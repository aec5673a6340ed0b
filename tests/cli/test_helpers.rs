//! CLI test helpers
//!
//! Provides utilities for testing CLI commands including:
//! - Services opened over a test wiki
//! - Config files pointing at a test wiki

use crate::common::{wiki_section, TestWiki};
use gnosis::core::config::Config;
use gnosis::core::services::Services;
use std::path::PathBuf;

/// Open services with one index named "wiki" over `wiki`
pub async fn create_cli_test_services(wiki: &TestWiki) -> Services {
    let config = Config {
        indexes: vec![wiki_section(wiki)],
        ..Config::default()
    };

    let services = Services::open(config).await;
    services.wait_until_crawled().await;
    services
}

/// Write a gnosis.toml for `wiki` into its data directory
pub fn write_config_file(wiki: &TestWiki) -> PathBuf {
    let path = wiki.data.path().join("gnosis.toml");
    let contents = format!(
        r#"[search]
default_page_size = 5

[[indexes]]
name = "wiki"
index_path = "{index}"
restricted = ["secret"]
debounce_ms = 100

[indexes.watch_dirs]
"{root}" = "/wiki/"
"#,
        index = wiki.index_path().display(),
        root = wiki.path().display(),
    );
    std::fs::write(&path, contents).expect("Failed to write config");
    path
}
