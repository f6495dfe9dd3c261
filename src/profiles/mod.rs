//! Demand and PV power profiles that feed the engine.

/// Synthetic site demand generator.
pub mod demand;
/// Recorded power series.
pub mod measured;
/// Synthetic PV generation model.
pub mod pv;
pub mod types;

pub use demand::DemandProfile;
pub use measured::MeasuredProfile;
pub use pv::PvProfile;
pub use types::{Profile, SampleContext};

use crate::sim::types::SimulationConfig;

/// Demand and PV sequences for one run, sampled on the run's step grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePair {
    pub demand_kw: Vec<f64>,
    pub pv_kw: Vec<f64>,
}

impl ProfilePair {
    /// Samples both sources over the run's period.
    pub fn sample(config: &SimulationConfig, demand: &mut dyn Profile, pv: &mut dyn Profile) -> Self {
        let clock = config.clock();
        Self {
            demand_kw: demand.generate(&clock),
            pv_kw: pv.generate(&clock),
        }
    }

    /// Synthetic demand and PV built from the run's parameters.
    ///
    /// `seed` drives the demand noise; the PV curve is deterministic.
    pub fn synthetic(config: &SimulationConfig, seed: u64) -> Self {
        let params = config.params();
        Self::sample(
            config,
            &mut DemandProfile::from_params(params, seed),
            &mut PvProfile::from_params(params),
        )
    }
}
