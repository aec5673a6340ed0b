//! Tests for configuration loading and command dispatch

use crate::cli::test_helpers::write_config_file;
use crate::common::TestWiki;
use clap::Parser;
use gnosis::cli::{run, Cli};
use serial_test::serial;

/// Keep XDG lookups inside the test's temp directory
fn isolate_xdg(wiki: &TestWiki) {
    std::env::set_var("GNOSIS_CONFIG_DIR", wiki.data.path().join("config"));
    std::env::set_var("GNOSIS_DATA_DIR", wiki.data.path().join("data"));
}

#[tokio::test]
#[serial]
async fn test_run_list_field_from_config_file() {
    let wiki = TestWiki::small();
    let config = write_config_file(&wiki);
    isolate_xdg(&wiki);

    let cli = Cli::parse_from([
        "gnosis",
        "--config",
        config.to_str().unwrap(),
        "--format",
        "json",
        "list-field",
        "author",
        "--index",
        "wiki",
    ]);
    run(cli).await.unwrap();

    assert!(wiki.index_path().join("meta.json").exists());
}

#[tokio::test]
#[serial]
async fn test_run_serve_once() {
    let wiki = TestWiki::small();
    let config = write_config_file(&wiki);
    isolate_xdg(&wiki);

    let cli = Cli::parse_from(["gnosis", "serve", "--once", "--config", config.to_str().unwrap()]);
    run(cli).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_run_show_config() {
    let wiki = TestWiki::small();
    let config = write_config_file(&wiki);
    isolate_xdg(&wiki);

    let cli = Cli::parse_from(["gnosis", "show-config", "--config", config.to_str().unwrap()]);
    run(cli).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_run_missing_config_file() {
    let wiki = TestWiki::small();
    let missing = wiki.data.path().join("missing.toml");
    isolate_xdg(&wiki);

    let cli = Cli::parse_from(["gnosis", "show-config", "--config", missing.to_str().unwrap()]);
    assert!(run(cli).await.is_err());
}
