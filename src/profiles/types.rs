//! Common types and traits for power profile sources.

use chrono::{DateTime, FixedOffset};

use crate::sim::clock::StepClock;

/// Where in the run a sample is being drawn.
///
/// # Fields
/// * `timestep` - Index of the step within the run
/// * `timestamp` - Start of the step, in the site's local offset
/// * `day_index` - Whole days elapsed since the period start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleContext {
    pub timestep: usize,
    pub timestamp: DateTime<FixedOffset>,
    pub day_index: i64,
}

impl SampleContext {
    pub fn new(timestep: usize, timestamp: DateTime<FixedOffset>, day_index: i64) -> Self {
        Self {
            timestep,
            timestamp,
            day_index,
        }
    }

    /// Context for step `timestep` of `clock`, or `None` past its last step.
    pub fn at(clock: &StepClock, timestep: usize) -> Option<Self> {
        let timestamp = clock.at(timestep)?;
        Some(Self::new(timestep, timestamp, clock.day_index(timestamp)))
    }
}

/// A source of power samples, one per simulation step.
///
/// Synthetic generators and measured series implement this trait so the
/// engine only ever sees two plain power sequences.
pub trait Profile {
    /// Returns the power (kW, >= 0) for the step described by `context`.
    fn power_kw(&mut self, context: &SampleContext) -> f64;

    /// Returns a human-readable name for the profile source.
    fn profile_type(&self) -> &'static str;

    /// Samples the profile at every step of `clock`, in order.
    fn generate(&mut self, clock: &StepClock) -> Vec<f64> {
        clock
            .iter()
            .enumerate()
            .map(|(t, ts)| self.power_kw(&SampleContext::new(t, ts, clock.day_index(ts))))
            .collect()
    }
}
