//! Configuration Integration Tests
//!
//! Settings persisted through `ConfigService` and resolved to a backend.

use std::fs;

use tempfile::TempDir;

use undoctrinator::services::select_backend;
use undoctrinator::{ConfigService, SettingsUpdate};
use undoctrinator_llm::ModelKind;

#[test]
fn test_first_run_creates_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let service = ConfigService::open(&path).unwrap();
    assert!(path.exists());
    assert_eq!(service.get_config().model_to_use, "LOCAL_QWEN");
    assert_eq!(select_backend(service.get_config()), Some(ModelKind::LocalQwen));

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["modelToUse"], "LOCAL_QWEN");
    assert_eq!(on_disk["openAiApiKey"], "");
}

#[test]
fn test_update_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut service = ConfigService::open(&path).unwrap();
    service
        .update_config(SettingsUpdate {
            model_to_use: Some("ANTHROPIC".to_string()),
            anthropic_api_key: Some("sk-ant-123456".to_string()),
            proxy_url: Some("socks5://127.0.0.1:1080".to_string()),
            ..Default::default()
        })
        .unwrap();

    let reopened = ConfigService::open(&path).unwrap();
    let config = reopened.get_config();
    assert_eq!(select_backend(config), Some(ModelKind::Anthropic));
    assert_eq!(config.anthropic_api_key, "sk-ant-123456");
    assert_eq!(config.proxy_url.as_deref(), Some("socks5://127.0.0.1:1080"));
    assert_eq!(config.redacted().anthropic_api_key, "****3456");
}

#[test]
fn test_legacy_and_unknown_model_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    fs::write(&path, r#"{"modelToUse": "WEBLLM_LLAMA"}"#).unwrap();
    let service = ConfigService::open(&path).unwrap();
    assert_eq!(select_backend(service.get_config()), Some(ModelKind::LocalLlama));

    fs::write(&path, r#"{"modelToUse": ""}"#).unwrap();
    let service = ConfigService::open(&path).unwrap();
    assert_eq!(select_backend(service.get_config()), Some(ModelKind::LocalQwen));

    fs::write(&path, r#"{"modelToUse": "MYSTERY_MODEL"}"#).unwrap();
    let service = ConfigService::open(&path).unwrap();
    assert_eq!(select_backend(service.get_config()), None);
}

#[test]
fn test_invalid_proxy_rejected_and_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let mut service = ConfigService::open(&path).unwrap();

    let err = service
        .update_config(SettingsUpdate {
            proxy_url: Some("ftp://proxy:21".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.name(), "ConfigurationError");
    assert!(service.get_config().proxy_url.is_none());

    service.reload().unwrap();
    assert!(service.get_config().proxy_url.is_none());
}
