//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::error::SimError;
use crate::io::import::load_profile_csv;
use crate::profiles::{DemandProfile, Profile, ProfilePair, PvProfile};
use crate::sim::params::SimParams;
use crate::sim::types::{ALLOWED_STEP_MINUTES, SimulationConfig};

const DEFAULT_PERIOD_START: &str = "2025-06-02T00:00:00+09:00";
const DEFAULT_PERIOD_DAYS: i64 = 7;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
///
/// Timestamps are RFC 3339 strings (quoted in TOML).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Period, step size and seed.
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Site parameter map.
    #[serde(default)]
    pub params: SimParams,
    /// Measured profile files; synthetic profiles are used when absent.
    #[serde(default)]
    pub profiles: ProfileSources,
}

/// Simulation period, step size and seed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Start of the half-open period.
    pub period_start: DateTime<FixedOffset>,
    /// End of the half-open period (exclusive).
    pub period_end: DateTime<FixedOffset>,
    /// Step size in minutes (5, 10, 15, 30 or 60).
    pub step_minutes: u32,
    /// Seed for the synthetic demand noise.
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let period_start = DateTime::parse_from_rfc3339(DEFAULT_PERIOD_START).unwrap_or_default();
        Self {
            period_start,
            period_end: period_start + Duration::days(DEFAULT_PERIOD_DAYS),
            step_minutes: 15,
            seed: 42,
        }
    }
}

/// Optional measured profile files.
///
/// Relative paths are resolved by the caller (the CLI resolves them against
/// the scenario file's directory).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSources {
    /// CSV with one demand sample (kW) per step.
    pub demand_csv: Option<PathBuf>,
    /// CSV with one PV sample (kW) per step.
    pub pv_csv: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.step_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: PV only, no battery.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            params: SimParams::default(),
            profiles: ProfileSources::default(),
        }
    }

    /// Returns the battery preset: 200 kWh storage with 50 kW limits.
    pub fn battery() -> Self {
        Self {
            params: SimParams {
                batt_capacity_kwh: 200.0,
                batt_pchg_kw: 50.0,
                batt_pdis_kw: 50.0,
                ..SimParams::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the peak-shaving preset: large battery, wide peak windows and
    /// a steep peak price.
    pub fn peak_shaving() -> Self {
        Self {
            params: SimParams {
                batt_capacity_kwh: 400.0,
                batt_pchg_kw: 100.0,
                batt_pdis_kw: 100.0,
                batt_rt_eff: 90.0,
                price_peak: 300.0,
                peak_start: 8.0,
                peak_end: 13.0,
                peak2_start: 17.0,
                peak2_end: 22.0,
                pv_kw_dc: 200.0,
                ..SimParams::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "battery", "peak_shaving"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "battery" => Ok(Self::battery()),
            "peak_shaving" => Ok(Self::peak_shaving()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.period_start >= s.period_end {
            errors.push(ConfigError {
                field: "simulation.period_start".into(),
                message: "must be before simulation.period_end".into(),
            });
        }
        if !ALLOWED_STEP_MINUTES.contains(&s.step_minutes) {
            errors.push(ConfigError {
                field: "simulation.step_minutes".into(),
                message: format!(
                    "must be one of {ALLOWED_STEP_MINUTES:?}, got {}",
                    s.step_minutes
                ),
            });
        }

        errors.extend(self.params.violations().into_iter().map(|e| ConfigError {
            field: format!("params.{}", e.field),
            message: e.message,
        }));

        for (field, path) in [
            ("profiles.demand_csv", &self.profiles.demand_csv),
            ("profiles.pv_csv", &self.profiles.pv_csv),
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        errors
    }

    /// Builds the engine's run configuration from this scenario.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if the period, step size or
    /// parameters are invalid.
    pub fn to_simulation_config(&self) -> Result<SimulationConfig, SimError> {
        let s = &self.simulation;
        SimulationConfig::new(s.period_start, s.period_end, s.step_minutes, self.params.clone())
    }

    /// Resolves the demand and PV sequences for a run of this scenario.
    ///
    /// Each side reads its CSV file when one is configured and falls back to
    /// the synthetic generator otherwise. Measured files are used as is, so a
    /// file that does not cover the period is reported by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`], [`SimError::Csv`] or
    /// [`SimError::InvalidParameter`] if a profile file cannot be read.
    pub fn load_profiles(&self, config: &SimulationConfig) -> Result<ProfilePair, SimError> {
        let params = config.params();
        let mut demand: Box<dyn Profile> = match self.profiles.demand_csv {
            Some(ref path) => Box::new(load_profile_csv(path, "MeasuredDemand")?),
            None => Box::new(DemandProfile::from_params(params, self.simulation.seed)),
        };
        let mut pv: Box<dyn Profile> = match self.profiles.pv_csv {
            Some(ref path) => Box::new(load_profile_csv(path, "MeasuredPV")?),
            None => Box::new(PvProfile::from_params(params)),
        };
        debug!(
            demand = demand.profile_type(),
            pv = pv.profile_type(),
            "profile sources resolved"
        );
        Ok(ProfilePair::sample(config, demand.as_mut(), pv.as_mut()))
    }
}
