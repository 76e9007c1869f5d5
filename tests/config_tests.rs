use std::fs;

use defi_yield_advisor::{
    adapters::{HydroAdapter, ProtocolAdapter},
    config::{ProtocolConfig, Settings},
    models::ProtocolKind,
};

#[test]
fn test_settings_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("helix.toml"),
        "api_url = \"http://localhost:8081/api\"\nenable_mock_data = false\nrequest_timeout_secs = 5\n",
    )
    .unwrap();
    fs::write(dir.path().join("neptune.json"), r#"{ "request_timeout_secs": 12 }"#).unwrap();

    let settings = Settings::from_dir(dir.path());

    let helix = settings.protocol(ProtocolKind::Helix);
    assert_eq!(helix.api_url, "http://localhost:8081/api");
    assert!(!helix.enable_mock_data);
    assert_eq!(helix.request_timeout_secs, 5);

    assert_eq!(settings.hydro, ProtocolConfig::for_protocol(ProtocolKind::Hydro));

    let neptune = settings.protocol(ProtocolKind::Neptune);
    assert_eq!(neptune.request_timeout_secs, 12);
    assert!(neptune.enable_mock_data);
}

#[test]
fn test_try_load_reports_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hydro.yaml"), "api_url: [unterminated\n").unwrap();

    assert!(ProtocolConfig::try_load(ProtocolKind::Hydro, dir.path()).is_err());
    assert_eq!(
        ProtocolConfig::load(ProtocolKind::Hydro, dir.path()),
        ProtocolConfig::for_protocol(ProtocolKind::Hydro)
    );
}

#[test]
fn test_live_config_with_dead_endpoint_serves_catalog() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("hydro.yaml"),
        "api_url: http://127.0.0.1:9/api\nenable_mock_data: false\nrequest_timeout_secs: 2\n",
    )
    .unwrap();

    let config = ProtocolConfig::try_load(ProtocolKind::Hydro, dir.path()).unwrap();
    let adapter = HydroAdapter::new(config).unwrap();

    let pools = tokio_test::block_on(adapter.get_pools()).unwrap();
    assert_eq!(pools.len(), 3);
    assert!(!tokio_test::block_on(adapter.is_available()));
}
