//! Simulation engine that folds the energy balance across a run.

use chrono::Timelike;
use tracing::{debug, info, warn};

use super::battery::BatteryState;
use super::kpi::{KpiAccumulator, KpiRates};
use super::power_balance::balance_step;
use super::pricing::Tariff;
use super::types::{SimulationConfig, SimulationOutput, TimeStepRecord};
use crate::error::SimError;

/// Simulation engine for one site configuration.
///
/// The engine owns no mutable state: every call to [`Engine::run`] starts a
/// fresh battery and a fresh set of accumulators, so one engine can serve
/// many runs and separate engines can run on separate threads.
#[derive(Debug, Clone)]
pub struct Engine {
    config: SimulationConfig,
    tariff: Tariff,
    battery: BatteryState,
    rates: KpiRates,
}

/// Carried from step to step.
struct RunState {
    battery: BatteryState,
    kpi: KpiAccumulator,
    records: Vec<TimeStepRecord>,
}

impl Engine {
    pub fn new(config: SimulationConfig) -> Self {
        let params = config.params();
        let tariff = Tariff::from_params(params);
        let battery = BatteryState::for_config(&config);
        let rates = KpiRates {
            dt_hours: config.step_hours(),
            feedin: params.feedin,
            co2_kg_per_kwh: params.co2_g_per_kwh / 1000.0,
        };
        Self {
            config,
            tariff,
            battery,
            rates,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Battery as it stands at the start of a run.
    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    /// Runs the simulation with the battery starting at the bottom of its band.
    ///
    /// # Arguments
    ///
    /// * `demand_kw` - Site demand, one sample per step
    /// * `pv_kw` - PV generation, one sample per step
    ///
    /// # Errors
    ///
    /// See [`Engine::run_from_soc`].
    pub fn run(&self, demand_kw: &[f64], pv_kw: &[f64]) -> Result<SimulationOutput, SimError> {
        self.simulate(self.battery, demand_kw, pv_kw)
    }

    /// Runs the simulation with the battery starting at `initial_soc_kwh`.
    ///
    /// Used to continue a long period in fragments: pass the previous
    /// fragment's `final_soc_kwh`.
    ///
    /// # Errors
    ///
    /// * [`SimError::InvalidParameter`] if the SOC lies outside the battery's
    ///   band or a profile sample is negative or non-finite
    /// * [`SimError::ProfileLengthMismatch`] if the profiles differ in length
    /// * [`SimError::ProfileTooLong`] if they have more samples than the
    ///   period has steps
    pub fn run_from_soc(
        &self,
        initial_soc_kwh: f64,
        demand_kw: &[f64],
        pv_kw: &[f64],
    ) -> Result<SimulationOutput, SimError> {
        let battery = self.battery.with_soc(initial_soc_kwh).ok_or_else(|| {
            SimError::invalid(
                "initialSocKwh",
                format!(
                    "must be within [{}, {}] kWh, got {initial_soc_kwh}",
                    self.battery.soc_min_kwh, self.battery.soc_max_kwh
                ),
            )
        })?;
        self.simulate(battery, demand_kw, pv_kw)
    }

    fn check_profiles(&self, demand_kw: &[f64], pv_kw: &[f64]) -> Result<(), SimError> {
        if demand_kw.len() != pv_kw.len() {
            return Err(SimError::ProfileLengthMismatch {
                demand: demand_kw.len(),
                pv: pv_kw.len(),
            });
        }
        let steps = self.config.step_count();
        if demand_kw.len() > steps {
            return Err(SimError::ProfileTooLong {
                samples: demand_kw.len(),
                steps,
            });
        }
        for (name, profile) in [("demand", demand_kw), ("pv", pv_kw)] {
            if let Some((i, v)) = profile
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(SimError::invalid(
                    format!("{name}[{i}]"),
                    format!("must be a finite, non-negative power, got {v}"),
                ));
            }
        }
        Ok(())
    }

    fn simulate(
        &self,
        battery: BatteryState,
        demand_kw: &[f64],
        pv_kw: &[f64],
    ) -> Result<SimulationOutput, SimError> {
        self.check_profiles(demand_kw, pv_kw)?;

        let n = demand_kw.len();
        if n < self.config.step_count() {
            debug!(samples = n, steps = self.config.step_count(), "profiles cover a prefix of the period");
        }
        if battery.is_present() && battery.max_charge_kw == 0.0 && battery.max_discharge_kw == 0.0 {
            warn!(
                capacity_kwh = battery.capacity_kwh,
                "battery has zero charge and discharge power; it will stay idle"
            );
        }
        debug!(
            steps = n,
            step_minutes = self.config.step_minutes(),
            battery_kwh = battery.capacity_kwh,
            initial_soc_kwh = battery.soc_kwh,
            "starting simulation run"
        );

        let dt_hours = self.rates.dt_hours;
        let clock = self.config.clock();
        let initial = RunState {
            battery,
            kpi: KpiAccumulator::default(),
            records: Vec::with_capacity(n),
        };

        let state = clock
            .iter()
            .zip(demand_kw.iter().zip(pv_kw))
            .fold(initial, |mut state, (timestamp, (&load, &pv))| {
                let price = self.tariff.price_at(timestamp.hour());
                let (battery, record) = balance_step(state.battery, timestamp, load, pv, price, dt_hours);
                state.kpi = state.kpi.add(&record, &self.rates);
                state.battery = battery;
                state.records.push(record);
                state
            });

        let kpi = state.kpi.finish(state.battery.capacity_kwh);
        info!(
            steps = state.records.len(),
            demand_kwh = kpi.demand_kwh,
            self_sufficiency = kpi.self_sufficiency,
            net_cost = kpi.net_cost,
            "simulation run complete"
        );

        Ok(SimulationOutput {
            records: state.records,
            kpi,
            final_soc_kwh: state.battery.soc_kwh,
        })
    }
}

/// Runs one simulation as a single call.
///
/// Convenience wrapper over [`Engine::new`] and [`Engine::run`].
///
/// # Errors
///
/// See [`Engine::run_from_soc`].
pub fn run_simulation(
    config: &SimulationConfig,
    demand_kw: &[f64],
    pv_kw: &[f64],
) -> Result<SimulationOutput, SimError> {
    Engine::new(config.clone()).run(demand_kw, pv_kw)
}
