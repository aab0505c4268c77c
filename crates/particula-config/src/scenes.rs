//! Factory scenes bundled with the library.
//!
//! Each scene is a complete [`EngineConfig`] embedded as TOML, so it reads
//! exactly like a user config file and goes through the same parser.

use crate::config::EngineConfig;
use crate::error::ConfigError;

/// Names of the factory scenes.
pub static FACTORY_SCENE_NAMES: &[&str] = &["gas", "rain", "burst", "orbit-ring"];

static FACTORY_SCENES_TOML: &[(&str, &str)] = &[
    ("gas", GAS_SCENE),
    ("rain", RAIN_SCENE),
    ("burst", BURST_SCENE),
    ("orbit-ring", ORBIT_RING_SCENE),
];

/// Dense, weightless field with short plucks.
const GAS_SCENE: &str = r#"
name = "Gas"
description = "Many small particles drifting through the whole field"

[params]
particle_multiplier = 8
gravity = 0.0
attack_time = 0.005
decay_half_life = 0.04
master_gain = -9.0
waveform = 0.1
spawn_origin = "uniform-interior"
size_scale = 0.5
size_by_note = true
"#;

/// Particles fall in from above and pile up on the floor.
const RAIN_SCENE: &str = r#"
name = "Rain"
description = "Drops fall from above the field under gravity"

[params]
particle_multiplier = 3
gravity = 2.0
attack_time = 0.002
decay_half_life = 0.08
master_gain = -6.0
waveform = 0.0
spawn_origin = "top-band"
size_scale = 1.0
size_by_note = true
"#;

/// Every trigger explodes out of one corner.
const BURST_SCENE: &str = r#"
name = "Burst"
description = "Clusters launched from the top-left corner"

[engine]
note_length = 0.25

[params]
particle_multiplier = 12
gravity = 0.5
attack_time = 0.01
decay_half_life = 0.15
master_gain = -12.0
waveform = 0.6
spawn_origin = "corner-cluster"
size_scale = 0.8
size_by_note = true
"#;

/// Equal-sized particles enter from every edge.
const ORBIT_RING_SCENE: &str = r#"
name = "Orbit Ring"
description = "Equal masses entering from outside every edge"

[engine]
step_interval = 128

[params]
particle_multiplier = 4
gravity = -0.2
attack_time = 0.05
decay_half_life = 0.3
master_gain = -10.0
waveform = 0.3
spawn_origin = "ring-exterior"
size_scale = 0.6
size_by_note = false
"#;

/// All factory scenes.
pub fn factory_scenes() -> Vec<(&'static str, EngineConfig)> {
    FACTORY_SCENES_TOML
        .iter()
        .filter_map(|(name, toml)| EngineConfig::from_toml(toml).ok().map(|c| (*name, c)))
        .collect()
}

/// Look up a scene by name, ignoring case.
pub fn get_factory_scene(name: &str) -> Result<EngineConfig, ConfigError> {
    let (_, toml) = FACTORY_SCENES_TOML
        .iter()
        .find(|(scene, _)| scene.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownScene(name.to_string()))?;
    EngineConfig::from_toml(toml)
}

/// Whether `name` is a factory scene.
pub fn is_factory_scene(name: &str) -> bool {
    FACTORY_SCENE_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}
