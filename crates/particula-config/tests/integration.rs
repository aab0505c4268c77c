//! Integration tests for particula-config.
//!
//! These tests verify file round trips and that configs and scores drive
//! the engine end to end.

use particula_config::{
    ConfigError, EngineConfig, Score, ScoreCursor, factory_scenes, get_factory_scene,
};
use particula_core::SpawnOrigin;
use particula_engine::{EngineParams, ParticleEngine};
use tempfile::TempDir;

#[test]
fn config_save_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("scene.toml");

    let mut config = get_factory_scene("burst").unwrap();
    config.engine.seed = 99;
    config.save(&path).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.engine_params().unwrap().spawn_origin, SpawnOrigin::CornerCluster);
}

#[test]
fn missing_file_reports_path() {
    let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("/definitely/not/here.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = EngineConfig::from_toml("[params]\ngravity = \"lots\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn params_section_roundtrips_engine_params() {
    let params = EngineParams {
        particle_multiplier: 7,
        spawn_origin: SpawnOrigin::RingExterior,
        size_by_note: false,
        ..EngineParams::default()
    };
    let mut config = EngineConfig::default();
    config.params = (&params).into();
    assert_eq!(config.engine_params().unwrap(), params);
}

#[test]
fn score_file_drives_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("score.toml");
    let score = Score::default()
        .with_note(0.0, 60, 1.0, 0.05)
        .with_note(0.01, 67, 0.8, 0.02);
    score.save(&path).unwrap();
    let score = Score::load(&path).unwrap();
    score.validate().unwrap();

    let config = EngineConfig::default();
    let settings = config.settings();
    let mut engine = ParticleEngine::with_params(settings, &config.engine_params().unwrap());
    let mut cursor = ScoreCursor::new(score.events(settings.sample_rate));

    let block = config.engine.block_size;
    let mut left = vec![0.0; block];
    let mut right = vec![0.0; block];
    let mut input = Vec::new();
    let mut max_active = 0;
    let mut start = 0u64;
    while !cursor.is_finished() {
        cursor.take_block(start, block, &mut input);
        engine.process(&mut left, &mut right, &input, &mut ());
        max_active = max_active.max(engine.simulation().active_count());
        start += block as u64;
    }
    assert_eq!(max_active, 10);
    assert_eq!(engine.simulation().active_count(), 0);
}

#[test]
fn every_scene_builds_an_engine() {
    for (name, config) in factory_scenes() {
        let params = config.engine_params().unwrap();
        let engine = ParticleEngine::with_params(config.settings(), &params);
        assert_eq!(engine.params(), &params, "{name}");
    }
}
