//! Shared CLI helpers used across multiple commands.

use clap::Args;
use particula_config::{EngineConfig, Score, get_factory_scene, parse_param_value};
use particula_engine::{EngineParams, EngineStats, ParamId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Options selecting the engine setup, shared by `render` and `play`.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Factory scene name (see `particula scenes`)
    #[arg(short, long)]
    pub scene: Option<String>,

    /// Engine configuration file (TOML); overrides --scene
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parameter override (e.g., "gravity=2" or "spawn_origin=top-band")
    #[arg(long = "set", value_parser = parse_key_val, number_of_values = 1)]
    pub set: Vec<(String, String)>,

    /// RNG seed for spawning and detune
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Options for the random score used when no score file is given.
#[derive(Args, Debug, Clone)]
pub struct RandomArgs {
    /// Length of the random score in seconds
    #[arg(long, default_value = "8")]
    pub length: f64,

    /// Average notes per second in the random score
    #[arg(long, default_value = "2")]
    pub density: f64,
}

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

/// Resolve the engine configuration.
///
/// Searches in this order:
/// 1. `--config` file
/// 2. `--scene` factory scene
/// 3. Built-in defaults
pub fn load_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let mut config = if let Some(path) = &args.config {
        EngineConfig::load(path)?
    } else if let Some(scene) = &args.scene {
        get_factory_scene(scene).map_err(|e| {
            anyhow::anyhow!("{e}. Use 'particula scenes' to see available scenes.")
        })?
    } else {
        EngineConfig::default()
    };

    if let Some(seed) = args.seed {
        config.engine.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Engine parameters from `config` with `--set` overrides applied.
pub fn resolve_params(config: &EngineConfig, overrides: &[(String, String)]) -> anyhow::Result<EngineParams> {
    let mut values = config.engine_params()?.to_values();
    for (name, text) in overrides {
        let value = parse_param_value(name, text)?;
        let id = ParamId::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown parameter: {name}"))?;
        values[id.index()] = value;
    }
    Ok(EngineParams::from_values(&values))
}

/// Load a score file, or build a random one.
pub fn load_score(path: Option<&Path>, random: &RandomArgs, seed: u64) -> anyhow::Result<Score> {
    let score = match path {
        Some(path) => Score::load(path)?,
        None => random_score(random.length, random.density, seed),
    };
    score.validate()?;
    Ok(score)
}

const PENTATONIC: [u8; 5] = [0, 2, 4, 7, 9];

/// A seeded score of pentatonic notes between C3 and C6.
pub fn random_score(length: f64, density: f64, seed: u64) -> Score {
    let length = length.max(0.0);
    let count = (length * density.max(0.0)).round() as usize;
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut score = Score {
        name: Some("random".to_string()),
        length: Some(length),
        ..Score::default()
    };
    for _ in 0..count {
        let octave = rng.gen_range(4u8..7);
        let pitch = PENTATONIC[rng.gen_range(0..PENTATONIC.len())];
        let time = rng.gen_range(0.0..=length * 0.8);
        let velocity = rng.gen_range(0.4f32..=1.0);
        let duration = rng.gen_range(0.1..=0.6);
        score = score.with_note(time, octave * 12 + pitch, velocity, duration);
    }
    score
}

/// Log drop counters and totals after a run.
pub fn log_stats(stats: &EngineStats) {
    tracing::info!(
        blocks = stats.blocks,
        steps = stats.steps,
        collisions = stats.collisions,
        stolen_voices = stats.stolen_voices,
        "engine finished"
    );
    if stats.dropped_spawns + stats.queue_overflows + stats.horizon_drops + stats.ignored_notes > 0 {
        tracing::warn!(
            dropped_spawns = stats.dropped_spawns,
            queue_overflows = stats.queue_overflows,
            horizon_drops = stats.horizon_drops,
            ignored_notes = stats.ignored_notes,
            "events were dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particula_core::SpawnOrigin;

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("spawn_origin = top-band").unwrap(),
            ("spawn_origin".to_string(), "top-band".to_string())
        );
        assert!(parse_key_val("gravity").is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let config = EngineConfig::default();
        let params = resolve_params(
            &config,
            &[
                ("gravity".to_string(), "3.5".to_string()),
                ("spawn_origin".to_string(), "ring-exterior".to_string()),
                ("size_by_note".to_string(), "off".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(params.gravity, 3.5);
        assert_eq!(params.spawn_origin, SpawnOrigin::RingExterior);
        assert!(!params.size_by_note);
        assert_eq!(params.particle_multiplier, 5);
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let config = EngineConfig::default();
        assert!(resolve_params(&config, &[("warp".to_string(), "1".to_string())]).is_err());
        assert!(resolve_params(&config, &[("gravity".to_string(), "99".to_string())]).is_err());
    }

    #[test]
    fn random_score_is_seeded() {
        let a = random_score(4.0, 3.0, 7);
        let b = random_score(4.0, 3.0, 7);
        assert_eq!(a.notes.len(), 12);
        assert_eq!(a, b);
        assert!(a.validate().is_ok());
        assert!(a.notes.iter().all(|n| (48..84).contains(&n.note)));
        assert_eq!(a.duration(), 4.0);
    }
}
