//! Configuration – reads/writes `~/.muonmet/config.toml`.

use anyhow::{Context, Result};
use muonmet_corrector::{CorrectorConfig, MagneticField, NoField, UniformField};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Solenoid field at the detector centre (tesla). Zero, negative or
    /// non-finite values mean no field record is available and every event
    /// fails with `MissingFieldRecord`.
    #[serde(default = "default_field_tesla")]
    pub field_tesla: f64,

    /// OTLP/HTTP collector for trace export. Spans stay local when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,

    /// Corrector switches.
    #[serde(default)]
    pub correction: CorrectorConfig,
}

fn default_field_tesla() -> f64 {
    3.8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_tesla: default_field_tesla(),
            otlp_endpoint: None,
            correction: CorrectorConfig::default(),
        }
    }
}

impl Config {
    /// The field service described by `field_tesla`.
    pub fn magnetic_field(&self) -> Box<dyn MagneticField> {
        if self.field_tesla.is_finite() && self.field_tesla > 0.0 {
            Box::new(UniformField(self.field_tesla))
        } else {
            Box::new(NoField)
        }
    }
}

/// Return the path to `~/.muonmet/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".muonmet").join("config.toml")
}

/// Load the effective configuration: the file at `path` (or the default
/// location), falling back to defaults when absent, then `MUONMET_*`
/// environment overrides.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let mut cfg = load_from(&path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config file at `path`. Returns `None` if it does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let cfg = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    Ok(Some(cfg))
}

/// Apply `MUONMET_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MUONMET_FIELD_TESLA` | `field_tesla` |
/// | `MUONMET_USE_HO` | `correction.use_ho` |
/// | `MUONMET_USE_REC_HITS` | `correction.use_rec_hits` |
/// | `MUONMET_TOWER_ET_THRESHOLD` | `correction.tower_et_threshold` |
/// | `MUONMET_USE_TRACK_ASSOCIATOR_POSITIONS` | `correction.use_track_associator_positions` |
/// | `MUONMET_LEGACY_ACCUMULATION_BUG` | `correction.legacy_accumulation_bug` |
/// | `MUONMET_LEGACY_ENDCAP_PHI_BUG` | `correction.legacy_endcap_phi_bug` |
/// | `MUONMET_LEGACY_ARITHMETIC_PHI_MEAN` | `correction.legacy_arithmetic_phi_mean` |
/// | `MUONMET_OTLP_ENDPOINT`, else `OTEL_EXPORTER_OTLP_ENDPOINT` | `otlp_endpoint` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(v) = env_parse::<f64>("MUONMET_FIELD_TESLA") {
        cfg.field_tesla = v;
    }
    if let Some(v) = env_flag("MUONMET_USE_HO") {
        cfg.correction.use_ho = v;
    }
    if let Some(v) = env_flag("MUONMET_USE_REC_HITS") {
        cfg.correction.use_rec_hits = v;
    }
    if let Some(v) = env_parse::<f64>("MUONMET_TOWER_ET_THRESHOLD") {
        cfg.correction.tower_et_threshold = v;
    }

    let switches: [(&str, &mut bool); 4] = [
        (
            "MUONMET_USE_TRACK_ASSOCIATOR_POSITIONS",
            &mut cfg.correction.use_track_associator_positions,
        ),
        (
            "MUONMET_LEGACY_ACCUMULATION_BUG",
            &mut cfg.correction.legacy_accumulation_bug,
        ),
        (
            "MUONMET_LEGACY_ENDCAP_PHI_BUG",
            &mut cfg.correction.legacy_endcap_phi_bug,
        ),
        (
            "MUONMET_LEGACY_ARITHMETIC_PHI_MEAN",
            &mut cfg.correction.legacy_arithmetic_phi_mean,
        ),
    ];
    for (name, switch) in switches {
        if let Some(v) = env_flag(name) {
            *switch = v;
        }
    }

    if let Some(endpoint) = ["MUONMET_OTLP_ENDPOINT", "OTEL_EXPORTER_OTLP_ENDPOINT"]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
    {
        cfg.otlp_endpoint = Some(endpoint);
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok()?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Save the config to `path` (or the default location), creating the parent
/// directory if necessary. Returns the path written.
pub fn save(cfg: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    save_to(cfg, &path)?;
    Ok(path)
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("failed to serialize config")?;
    fs::write(path, raw).with_context(|| format!("failed to write config at {}", path.display()))?;
    Ok(())
}
