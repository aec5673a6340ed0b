//! Tests for the wipe-index CLI command

use crate::cli::test_helpers::create_cli_test_services;
use crate::common::TestWiki;
use gnosis::cli::commands::wipe::{execute, WipeArgs};
use gnosis::cli::OutputFormat;

#[tokio::test]
async fn test_wipe_forced() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let args = WipeArgs {
        index: "wiki".to_string(),
        force: true,
    };
    execute(args, &services, OutputFormat::Json).await.unwrap();

    let store = services.store("wiki").unwrap();
    assert_eq!(store.num_docs().unwrap(), 0);

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_wipe_unknown_index() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let args = WipeArgs {
        index: "other".to_string(),
        force: true,
    };
    assert!(execute(args, &services, OutputFormat::Human).await.is_err());

    services.close().await.unwrap();
}
