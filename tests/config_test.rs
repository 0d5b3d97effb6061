// Integration tests for configuration loading

use mender::config::{load_config_from, ProviderEntry};
use mender::providers::create_primary_provider;
use mender::validation::ValidationStrategy;
use std::fs;

#[test]
fn test_config_file_drives_healer_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        metrics_dir = "/tmp/mender-metrics"

        [[providers]]
        type = "openai"
        api_key = "sk-test"
        model = "gpt-4o-mini"

        [healing]
        max_attempts = 4
        strategies = ["syntax", "typecheck"]
        require_user_confirmation = false

        [validation]
        project_root = "/srv/app"
        "#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();

    assert_eq!(config.healing.max_attempts, 4);
    assert_eq!(
        config.healing.strategies,
        vec![ValidationStrategy::Syntax, ValidationStrategy::TypeCheck]
    );
    assert!(!config.healing.require_user_confirmation);
    assert!(matches!(config.providers[0], ProviderEntry::Openai { .. }));

    let settings = config.validator_settings();
    assert_eq!(settings.project_root, std::path::PathBuf::from("/srv/app"));

    let provider = create_primary_provider(&config).unwrap();
    assert_eq!(provider.default_model(), "gpt-4o-mini");
}

#[test]
fn test_zero_attempts_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[[providers]]\ntype = \"claude\"\napi_key = \"sk-ant\"\n\n[healing]\nmax_attempts = 0\n",
    )
    .unwrap();

    assert!(load_config_from(&path).is_err());
}
