// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
#[allow(unused_imports)]
pub use fixtures::{TestWiki, Utf8TestData};
#[allow(unused_imports)]
pub use helpers::{
    eventually, hit_paths, open_engine, open_store, test_search_config, wiki_section,
};
