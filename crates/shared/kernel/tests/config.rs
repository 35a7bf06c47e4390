use fhub_domain::config::ApiConfigInner;
use fhub_kernel::config::load_config;
use serial_test::serial;
use std::fs;

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("server.toml");
    fs::write(&path, body).expect("write config file");
    path
}

#[test]
#[serial]
fn loads_layered_config_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
        [server]
        address = "0.0.0.0"
        port = 8080

        [dashboard]
        delete = ["OldFlag"]

        [dashboard.add_if_missing.Beta]
        is_enabled = true
        description = "beta cohort"
        "#,
    );

    let config: ApiConfigInner = load_config(Some(&path)).expect("load");
    assert_eq!(config.server.address, std::net::IpAddr::from([0, 0, 0, 0]));
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.dashboard.delete, vec!["OldFlag".to_owned()]);
    assert!(config.dashboard.add_if_missing.contains_key("Beta"));
}

#[test]
#[serial]
fn missing_sections_fall_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "");

    let config: ApiConfigInner = load_config(Some(&path)).expect("load");
    assert_eq!(config.server.port, 4710);
    assert!(config.dashboard.is_empty());
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let result = load_config::<ApiConfigInner>(Some("/nonexistent/server.toml"));
    assert!(result.is_err());
}
