//! Nanogrid energy-balance simulator.
//!
//! Steps a site's demand and PV generation through a greedy battery dispatch
//! and a time-of-day tariff, producing one record per step plus a KPI
//! summary. The engine in [`sim`] is pure; [`profiles`], [`io`] and
//! [`config`] supply its inputs and persist its outputs.

/// Command-line arguments for the binary.
pub mod cli;
/// TOML scenario files and presets.
pub mod config;
pub mod error;
/// CSV/JSON export and measured profile import.
pub mod io;
pub mod profiles;
/// Simulation engine, battery, tariff and KPI modules.
pub mod sim;

pub use error::{ParamError, SimError};
