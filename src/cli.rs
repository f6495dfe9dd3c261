//! Command-line interface for the `nanogrid-sim` binary.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{ConfigError, ScenarioConfig};

/// Default cap on the number of steps a single run may have: one leap year
/// of 5-minute steps.
pub const DEFAULT_MAX_STEPS: usize = 366 * 288;

/// Nanogrid energy-balance simulator.
///
/// Loads a scenario, runs the engine over its period, prints every step and
/// the KPI report. Without `--scenario` or `--preset` the baseline preset is
/// used.
#[derive(Debug, Clone, Parser)]
#[command(name = "nanogrid-sim", version, about, long_about = None)]
pub struct Cli {
    /// Load scenario from TOML config file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, battery, peak_shaving).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override a site parameter, e.g. `--param battCapacityKwh=100`.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, f64)>,

    /// Measured demand profile (CSV, kW in the last column).
    #[arg(long, value_name = "PATH")]
    pub demand_csv: Option<PathBuf>,

    /// Measured PV profile (CSV, kW in the last column).
    #[arg(long, value_name = "PATH")]
    pub pv_csv: Option<PathBuf>,

    /// Start the battery at this SOC (kWh) instead of its minimum.
    #[arg(long, value_name = "KWH")]
    pub initial_soc_kwh: Option<f64>,

    /// Export step records to CSV.
    #[arg(long, value_name = "PATH")]
    pub telemetry_out: Option<PathBuf>,

    /// Export the KPI summary to JSON.
    #[arg(long, value_name = "PATH")]
    pub kpi_out: Option<PathBuf>,

    /// Refuse to run periods with more steps than this.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,

    /// Skip per-step output; only the KPI report is printed.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Parses a `KEY=VALUE` parameter override.
fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{s}\""))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for \"{}\": {e}", key.trim()))?;
    Ok((key.trim().to_string(), value))
}

impl Cli {
    /// Builds the scenario the command line asks for.
    ///
    /// `--scenario` takes priority, then `--preset`, then the baseline. The
    /// seed, parameter and profile overrides are applied on top. Profile
    /// paths from a scenario file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the scenario cannot be loaded or a
    /// parameter override names an unknown key.
    pub fn load_scenario(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut scenario = if let Some(ref path) = self.scenario {
            let mut cfg = ScenarioConfig::from_toml_file(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            for csv in [&mut cfg.profiles.demand_csv, &mut cfg.profiles.pv_csv] {
                if let Some(p) = csv.as_mut().filter(|p| p.is_relative()) {
                    *p = base.join(&*p);
                }
            }
            cfg
        } else if let Some(ref name) = self.preset {
            ScenarioConfig::from_preset(name)?
        } else {
            ScenarioConfig::baseline()
        };

        if let Some(seed) = self.seed {
            scenario.simulation.seed = seed;
        }
        for (key, value) in &self.params {
            scenario.params.set(key, *value).map_err(|e| ConfigError {
                field: format!("params.{}", e.field),
                message: e.message,
            })?;
        }
        if let Some(ref path) = self.demand_csv {
            scenario.profiles.demand_csv = Some(path.clone());
        }
        if let Some(ref path) = self.pv_csv {
            scenario.profiles.pv_csv = Some(path.clone());
        }

        Ok(scenario)
    }
}
