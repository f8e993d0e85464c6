//! Tests for configuration layer precedence.

use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::{Layer, compose};

#[rstest]
#[case::file_overrides_defaults(
    vec![(Layer::Defaults, json!({"database_url": "default.db"})), (Layer::File, json!({"database_url": "file.db"}))],
    "file.db"
)]
#[case::environment_overrides_file(
    vec![(Layer::File, json!({"database_url": "file.db"})), (Layer::Environment, json!({"database_url": "env.db"}))],
    "env.db"
)]
#[case::cli_overrides_environment(
    vec![(Layer::Environment, json!({"database_url": "env.db"})), (Layer::Cli, json!({"database_url": "cli.db"}))],
    "cli.db"
)]
fn database_url_follows_layer_precedence(
    #[case] layers: Vec<(Layer, Value)>,
    #[case] expected: &str,
) {
    let config = compose(&layers);

    assert_eq!(config.database_url, expected);
}

#[rstest]
fn unset_fields_keep_service_defaults() {
    let config = compose(&[(Layer::File, json!({"port": 9000}))]);

    assert_eq!(config.port, 9000);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.database_url, "cooldown.db");
    assert_eq!(config.cache_ttl_seconds, 86_400);
    assert_eq!(config.token_cache_ttl_seconds, 300);
    assert_eq!(config.request_timeout_seconds, 30);
    assert_eq!(config.github_api_url, "https://api.github.com");
    assert!(!config.migrate_db, "migrate_db should default to false");
}

#[rstest]
fn full_precedence_chain() {
    let config = compose(&[
        (
            Layer::Defaults,
            json!({"port": 1, "cache_ttl_seconds": 10, "github_api_url": "http://defaults"}),
        ),
        (
            Layer::File,
            json!({"port": 2, "cache_ttl_seconds": 20, "github_api_url": "http://file"}),
        ),
        (Layer::Environment, json!({"port": 3, "cache_ttl_seconds": 30})),
        (Layer::Cli, json!({"port": 4})),
    ]);

    assert_eq!(config.port, 4, "CLI wins for port");
    assert_eq!(
        config.cache_ttl_seconds, 30,
        "environment wins for cache_ttl_seconds (no CLI override)"
    );
    assert_eq!(
        config.github_api_url, "http://file",
        "file wins for github_api_url (no env/CLI override)"
    );
}

#[rstest]
fn migrate_db_layer_precedence_defaults_file_environment_cli() {
    let config = compose(&[
        (Layer::Defaults, json!({"migrate_db": false})),
        (Layer::File, json!({"migrate_db": true})),
        (Layer::Environment, json!({"migrate_db": false})),
        (Layer::Cli, json!({"migrate_db": true})),
    ]);

    assert!(config.migrate_db, "CLI layer should win for migrate_db");
}
