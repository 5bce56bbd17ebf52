use std::fs;

use serial_test::serial;

use crate::config::secrets::SecretStoreConfig;
use crate::secrets::{initialize, SecretError, SecretStoreKind};
use crate::utils::config_loader::{self, ConfigOverrides};

const BUNDLE: &str = r#"{"APP_ID":"970CA35de60c44645bbae8a215061b33","APP_CERTIFICATE":"5CFd2fd1755d40ecb72977518be15d3b","BASE_URL":"https://example.invalid"}"#;

#[tokio::test]
#[serial]
async fn yaml_file_store_bootstrap() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let secrets_dir = dir.path().join("secrets");
    fs::create_dir(&secrets_dir)?;
    fs::write(secrets_dir.join("rtc-staging.json"), BUNDLE)?;

    let config_path = dir.path().join("token-service.yaml");
    fs::write(
        &config_path,
        format!(
            "settings:\n  server:\n    port: ${{STARTUP_TEST_PORT:9100}}\nsecrets:\n  name: rtc-staging\n  store:\n    type: file\n    dir: {}\n",
            secrets_dir.display()
        ),
    )?;

    std::env::remove_var("STARTUP_TEST_PORT");
    let cfg = config_loader::run(config_path.to_str().unwrap(), &ConfigOverrides::default()).await?;
    assert_eq!(cfg.settings.server.port, 9100);
    assert!(matches!(cfg.secrets.store, SecretStoreConfig::File { .. }));

    let store = SecretStoreKind::from_config(&cfg.secrets.store);
    assert_eq!(store.kind(), "file");
    let credentials = initialize(&store, &cfg.secrets.name).await?;
    assert_eq!(credentials.app_id(), "970CA35de60c44645bbae8a215061b33");
    Ok(())
}

#[tokio::test]
#[serial]
async fn missing_config_file_uses_defaults_and_overrides() -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        port: Some(7070),
        secret_name: Some("rtc-dev".to_string()),
    };
    let cfg = config_loader::run("/nonexistent/token-service.yaml", &overrides).await?;

    assert_eq!(cfg.settings.server.port, 7070);
    assert_eq!(cfg.secrets.name, "rtc-dev");
    assert_eq!(cfg.secrets.store, SecretStoreConfig::Env);

    std::env::set_var("RTC_DEV", BUNDLE);
    let store = SecretStoreKind::from_config(&cfg.secrets.store);
    let credentials = initialize(&store, &cfg.secrets.name).await;
    std::env::remove_var("RTC_DEV");
    assert!(credentials.is_ok());
    Ok(())
}

#[tokio::test]
#[serial]
async fn absent_or_empty_secret_aborts_startup() {
    std::env::remove_var("RTC_ABSENT");
    let store = SecretStoreKind::from_config(&SecretStoreConfig::Env);
    assert!(matches!(
        initialize(&store, "rtc-absent").await,
        Err(SecretError::Unavailable { .. })
    ));

    std::env::set_var("RTC_EMPTY", r#"{"APP_ID":"abc","APP_CERTIFICATE":""}"#);
    let result = initialize(&store, "rtc-empty").await;
    std::env::remove_var("RTC_EMPTY");
    assert!(matches!(result, Err(SecretError::EmptyCredentials { .. })));
}
