//! Core simulation types: run configuration, step records and run output.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::clock::StepClock;
use super::kpi::KpiSummary;
use super::params::SimParams;
use crate::error::SimError;

/// Step sizes a run may use, in minutes.
pub const ALLOWED_STEP_MINUTES: [u32; 5] = [5, 10, 15, 30, 60];

/// Immutable description of one simulation run.
///
/// Built once with [`SimulationConfig::new`], which validates the period,
/// the step size and every parameter.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use nanogrid_sim::sim::params::SimParams;
/// use nanogrid_sim::sim::types::SimulationConfig;
///
/// let start = DateTime::parse_from_rfc3339("2025-06-02T00:00:00+09:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2025-06-03T00:00:00+09:00").unwrap();
/// let cfg = SimulationConfig::new(start, end, 15, SimParams::default()).unwrap();
/// assert_eq!(cfg.step_count(), 96);
/// assert_eq!(cfg.step_hours(), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    period_start: DateTime<FixedOffset>,
    period_end: DateTime<FixedOffset>,
    step_minutes: u32,
    params: SimParams,
}

impl SimulationConfig {
    /// Creates a validated run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `period_start >= period_end`,
    /// if `step_minutes` is not one of [`ALLOWED_STEP_MINUTES`], or if any
    /// parameter fails [`SimParams::validate`].
    pub fn new(
        period_start: DateTime<FixedOffset>,
        period_end: DateTime<FixedOffset>,
        step_minutes: u32,
        params: SimParams,
    ) -> Result<Self, SimError> {
        if period_start >= period_end {
            return Err(SimError::invalid(
                "periodStart",
                format!("must be before periodEnd ({period_start} >= {period_end})"),
            ));
        }
        if !ALLOWED_STEP_MINUTES.contains(&step_minutes) {
            return Err(SimError::invalid(
                "stepMinutes",
                format!("must be one of {ALLOWED_STEP_MINUTES:?}, got {step_minutes}"),
            ));
        }
        params.validate()?;

        Ok(Self {
            period_start,
            period_end,
            step_minutes,
            params,
        })
    }

    pub fn period_start(&self) -> DateTime<FixedOffset> {
        self.period_start
    }

    pub fn period_end(&self) -> DateTime<FixedOffset> {
        self.period_end
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Step duration in hours.
    pub fn step_hours(&self) -> f64 {
        f64::from(self.step_minutes) / 60.0
    }

    /// Clock over the run's half-open period.
    pub fn clock(&self) -> StepClock {
        StepClock::new(self.period_start, self.period_end, self.step_minutes)
    }

    /// Number of whole steps in `[period_start, period_end)`.
    pub fn step_count(&self) -> usize {
        self.clock().len()
    }
}

/// Complete record of one simulated interval.
///
/// Values are kept at full precision; rounding is applied by the export layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStepRecord {
    /// Start of the interval.
    pub timestamp: DateTime<FixedOffset>,
    /// Site demand (kW).
    pub load_kw: f64,
    /// PV generation (kW).
    pub pv_kw: f64,
    /// PV serving load directly (kW).
    pub direct_kw: f64,
    /// Battery energy after the step (kWh).
    pub soc_kwh: f64,
    /// Grid import (kW, >= 0).
    pub import_kw: f64,
    /// Grid export (kW, >= 0).
    pub export_kw: f64,
    /// Battery charge power (kW, >= 0).
    pub charge_kw: f64,
    /// Battery discharge power (kW, >= 0).
    pub discharge_kw: f64,
    /// Discarded generation (kW); reserved, always 0.
    pub curtail_kw: f64,
    /// Import price for the interval (currency/kWh).
    pub price: f64,
}

impl fmt::Display for TimeStepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | load={:>8.3} kW  pv={:>8.3} kW | import={:>8.3} kW  export={:>8.3} kW | \
             chg={:.3}  dis={:.3}  (SoC={:.3} kWh) | price={:.2}",
            self.timestamp.format("%Y-%m-%d %H:%M%:z"),
            self.load_kw,
            self.pv_kw,
            self.import_kw,
            self.export_kw,
            self.charge_kw,
            self.discharge_kw,
            self.soc_kwh,
            self.price,
        )
    }
}

/// Everything a run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    /// One record per step, in timestamp order.
    pub records: Vec<TimeStepRecord>,
    /// Aggregate indicators over the whole run.
    pub kpi: KpiSummary,
    /// Battery energy after the last step; feed into the next fragment.
    pub final_soc_kwh: f64,
}
