//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset};
use nanogrid_sim::sim::params::SimParams;
use nanogrid_sim::sim::types::SimulationConfig;

/// Monday 2025-06-02 00:00 in JST.
pub const START: &str = "2025-06-02T00:00:00+09:00";

pub fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("valid timestamp")
}

/// Run configuration starting at [`START`] spanning `hours`.
pub fn config(hours: i64, step_minutes: u32, params: SimParams) -> SimulationConfig {
    let start = ts(START);
    SimulationConfig::new(start, start + Duration::hours(hours), step_minutes, params)
        .expect("valid config")
}

/// Parameters with no peak hours: both windows empty.
pub fn flat_tariff(price_peak: f64, price_off: f64) -> SimParams {
    SimParams {
        price_peak,
        price_off,
        peak_start: 0.0,
        peak_end: 0.0,
        peak2_start: 0.0,
        peak2_end: 0.0,
        ..SimParams::default()
    }
}

/// 100 kWh battery, band [10, 90] %, 50 kW limits, lossless.
pub fn lossless_battery() -> SimParams {
    SimParams {
        batt_capacity_kwh: 100.0,
        batt_pchg_kw: 50.0,
        batt_pdis_kw: 50.0,
        batt_rt_eff: 100.0,
        batt_soc_min_pct: 10.0,
        batt_soc_max_pct: 90.0,
        ..SimParams::default()
    }
}

/// Mid-size battery with the default 92 % round-trip efficiency.
pub fn default_battery() -> SimParams {
    SimParams {
        batt_capacity_kwh: 200.0,
        batt_pchg_kw: 50.0,
        batt_pdis_kw: 50.0,
        ..SimParams::default()
    }
}
