use fhub_domain::config::{ApiConfig, ServerConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4710);
    assert!(server.ssl.is_none());
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "log": { "json": true },
        "dashboard": {
            "delete": ["Legacy"],
            "add_if_missing": { "Beta": { "is_enabled": true } }
        }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert!(cfg.log.json);
    assert_eq!(cfg.dashboard.delete, vec!["Legacy".to_owned()]);
    assert!(cfg.dashboard.add_if_missing.contains_key("Beta"));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: ApiConfig = serde_json::from_value(json!({})).expect("config deserialize");
    assert_eq!(cfg.server.port, 4710);
    assert!(cfg.dashboard.is_empty());
    assert!(cfg.log.path.is_none());
}
