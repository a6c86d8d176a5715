//! Persistence tests for filter configurations


use pose_filter::config::{Config, PredictorConfig, SmootherConfig, TrackingConfig};
use pose_filter::filters::des_predictor::DesPredictor;
use pose_filter::filters::des_smoother::DesSmoother;
use pose_filter::filters::{PosePredictor, PoseSmoother};
use pose_filter::Error;
use std::fs;
use tempfile::TempDir;
use test_helpers::noisy_circle;

#[test]
fn test_restored_smoother_behaves_identically() {
    let original = DesSmoother::from_config(&SmootherConfig {
        trans_alpha: 0.35,
        trans_gamma: 0.2,
        rot_alpha: 0.6,
        rot_gamma: 0.4,
        trans_threshold: 0.5,
        rot_threshold: -1.0,
    })
    .unwrap();

    let yaml = original.config().to_yaml().unwrap();
    let restored_config = SmootherConfig::from_yaml(&yaml).unwrap();
    assert_eq!(&restored_config, original.config());

    let mut original = original;
    let mut restored = DesSmoother::from_config(&restored_config).unwrap();
    for sample in noisy_circle(120, 0.05, 3) {
        assert_eq!(original.filter(&sample), restored.filter(&sample));
    }
}

#[test]
fn test_restored_predictor_behaves_identically() {
    let config = PredictorConfig {
        trans_alpha: 0.25,
        rot_alpha: 0.7,
        delta_ms: 16,
        trans_threshold: -1.0,
        rot_threshold: 0.8,
    };
    let restored_config = PredictorConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(restored_config, config);

    let mut original = DesPredictor::from_config(&config).unwrap();
    let mut restored = DesPredictor::from_config(&restored_config).unwrap();
    for sample in noisy_circle(120, 0.05, 4) {
        original.update(&sample);
        restored.update(&sample);
        assert_eq!(original.predict(48.0), restored.predict(48.0));
    }
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracking.yaml");

    let mut config = Config::default();
    config.tracking = TrackingConfig {
        smoother: Some(SmootherConfig {
            rot_threshold: 0.3,
            ..SmootherConfig::uniform(0.4, 0.1)
        }),
        predictor: None,
        max_dropouts: -1,
    };
    config.stream.precision = 3;

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_written_file_uses_persisted_key_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracking.yaml");
    Config::default().to_file(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    for key in ["TransAlpha", "TransGamma", "RotAlpha", "RotGamma", "Delta"] {
        assert!(content.contains(key), "Missing key {key} in:\n{content}");
    }
    // Disabled thresholds are not written
    assert!(!content.contains("Threshold"));
}

#[test]
fn test_invalid_files_are_rejected() {
    let dir = TempDir::new().unwrap();

    let bad_alpha = dir.path().join("bad_alpha.yaml");
    fs::write(&bad_alpha, "tracking:\n  smoother:\n    TransAlpha: 1.5\n").unwrap();
    assert!(matches!(Config::from_file(&bad_alpha), Err(Error::ConfigError(_))));

    let bad_delta = dir.path().join("bad_delta.yaml");
    fs::write(&bad_delta, "tracking:\n  predictor:\n    Delta: 0\n").unwrap();
    assert!(matches!(Config::from_file(&bad_delta), Err(Error::ConfigError(_))));

    let garbage = dir.path().join("garbage.yaml");
    fs::write(&garbage, "tracking: [not, a, map]\n").unwrap();
    assert!(matches!(Config::from_file(&garbage), Err(Error::ConfigError(_))));

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(Config::from_file(&missing), Err(Error::Io(_))));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = Config::from_yaml("stream:\n  precision: 2\n").unwrap();
    assert_eq!(config.stream.precision, 2);
    assert_eq!(config.tracking, TrackingConfig::default());
}
