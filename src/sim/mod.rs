/// Battery state and greedy dispatch.
pub mod battery;
/// Timestamp clock over a half-open period.
pub mod clock;
pub mod engine;
pub mod kpi;
pub mod params;
pub mod power_balance;
/// Time-of-day tariff.
pub mod pricing;
pub mod types;

pub use engine::{Engine, run_simulation};
pub use kpi::KpiSummary;
pub use params::SimParams;
pub use types::{SimulationConfig, SimulationOutput, TimeStepRecord};
