//! Tests for the field listing CLI commands

use crate::cli::test_helpers::create_cli_test_services;
use crate::common::TestWiki;
use gnosis::cli::commands::field::{
    execute_list, execute_values, ListFieldArgs, ListFieldValuesArgs,
};
use gnosis::cli::OutputFormat;

#[tokio::test]
async fn test_list_field() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let args = ListFieldArgs {
            field: "topic".to_string(),
            index: "wiki".to_string(),
        };
        assert!(execute_list(args, &services, format).await.is_ok());
    }

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_list_unknown_field() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let args = ListFieldArgs {
        field: "colour".to_string(),
        index: "wiki".to_string(),
    };
    assert!(execute_list(args, &services, OutputFormat::Human)
        .await
        .is_err());

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_list_field_values() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let args = ListFieldValuesArgs {
        field: "author".to_string(),
        value: "bob".to_string(),
        index: "wiki".to_string(),
        page: 0,
        page_size: 0,
    };
    assert!(execute_values(args, &services, OutputFormat::Json)
        .await
        .is_ok());

    services.close().await.unwrap();
}
