use crate::geometry::Size;
use crate::layout::wheel::{TriggerId, TriggerSpec};
use crate::layout::{
    ARROW_MARGIN, CENTER_BIAS, DEFAULT_TRIGGER_SIZE, DESKTOP_SCALE, HUB_MIN_RADIUS, HUB_WEIGHT,
    MAX_ITERATIONS, MOBILE_EXTRA_GAP, MOBILE_MAX_WIDTH, MOBILE_SCALE, PANEL_FLOOR, PANEL_GAP,
    PUSH_EPSILON, VIEWPORT_MARGIN, WHEEL_RADIUS,
};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Compass direction for a trigger, in screen space (north is up).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[strum(serialize = "North", serialize = "n")]
    North,
    #[strum(serialize = "NorthEast", serialize = "ne")]
    NorthEast,
    #[strum(serialize = "East", serialize = "e")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se")]
    SouthEast,
    #[strum(serialize = "South", serialize = "s")]
    South,
    #[strum(serialize = "SouthWest", serialize = "sw")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw")]
    NorthWest,
}

impl Direction {
    /// Angle in degrees with y growing downward, so north is 270.
    pub fn degrees(&self) -> f64 {
        match self {
            Self::East => 0.0,
            Self::SouthEast => 45.0,
            Self::South => 90.0,
            Self::SouthWest => 135.0,
            Self::West => 180.0,
            Self::NorthWest => 225.0,
            Self::North => 270.0,
            Self::NorthEast => 315.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    pub id: TriggerId,
    pub angle: Option<f64>,
    pub direction: Option<Direction>,
}

impl TriggerConfig {
    pub fn at(id: &str, angle: f64) -> Self {
        Self {
            id: TriggerId::new(id),
            angle: Some(angle),
            direction: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WheelSettings {
    /// Orbit radius of the triggers before scaling.
    pub radius: f64,
    /// Used for triggers the host has not measured yet; scaled with the wheel.
    pub trigger_size: Size,
    pub hub_min_radius: f64,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            radius: WHEEL_RADIUS,
            trigger_size: DEFAULT_TRIGGER_SIZE,
            hub_min_radius: HUB_MIN_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelSettings {
    pub min_size: Size,
    pub gap: f64,
    pub mobile_extra_gap: f64,
    pub margin: f64,
    pub center_bias: f64,
    pub arrow_margin: f64,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            min_size: PANEL_FLOOR,
            gap: PANEL_GAP,
            mobile_extra_gap: MOBILE_EXTRA_GAP,
            margin: VIEWPORT_MARGIN,
            center_bias: CENTER_BIAS,
            arrow_margin: ARROW_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollisionSettings {
    pub max_iterations: usize,
    pub epsilon: f64,
    pub hub_weight: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            epsilon: PUSH_EPSILON,
            hub_weight: HUB_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakpointSettings {
    pub mobile_max_width: f64,
    pub mobile_scale: f64,
    pub desktop_scale: f64,
}

impl Default for BreakpointSettings {
    fn default() -> Self {
        Self {
            mobile_max_width: MOBILE_MAX_WIDTH,
            mobile_scale: MOBILE_SCALE,
            desktop_scale: DESKTOP_SCALE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub wheel: WheelSettings,
    pub panel: PanelSettings,
    pub collision: CollisionSettings,
    pub breakpoint: BreakpointSettings,
    pub triggers: Vec<TriggerConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wheel: WheelSettings::default(),
            panel: PanelSettings::default(),
            collision: CollisionSettings::default(),
            breakpoint: BreakpointSettings::default(),
            triggers: vec![
                TriggerConfig::at("ask", 270.0),
                TriggerConfig::at("tone", 30.0),
                TriggerConfig::at("fix", 150.0),
            ],
        }
    }
}

impl Settings {
    /// Resolves each configured trigger to an angle. Explicit angles win over
    /// directions; triggers with neither are spread evenly starting at north.
    pub fn trigger_specs(&self) -> Vec<TriggerSpec> {
        let count = self.triggers.len().max(1) as f64;
        self.triggers
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let angle = t
                    .angle
                    .or_else(|| t.direction.map(|d| d.degrees()))
                    .unwrap_or_else(|| 270.0 + i as f64 * 360.0 / count);
                TriggerSpec::new(t.id.clone(), angle)
            })
            .collect()
    }
}

const ENV_PREFIX: &str = "ORBIT";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no home directory to keep orbit's config in")]
    NoProjectDirs,
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-user config file, e.g. `~/.config/orbit/config.toml` on Linux.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("org", "troia", "orbit")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .ok_or(ConfigError::NoProjectDirs)
}

/// Settings from `path` (which may be missing) overlaid with `ORBIT_*`
/// environment variables; nested keys use `__`, e.g. `ORBIT_PANEL__GAP=16`.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&get_config_path()?)
}

pub fn load_or_default() -> Settings {
    match load_settings() {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Falling back to default settings: {}", e);
            Settings::default()
        }
    }
}

/// Writes the default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn write_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs_err::create_dir_all(dir)?;
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
