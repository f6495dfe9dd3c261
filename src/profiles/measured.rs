use super::types::{Profile, SampleContext};
use crate::sim::clock::StepClock;

/// A recorded power series replayed step by step.
///
/// Sample `i` belongs to step `i` of the run; steps beyond the recording
/// read as zero from [`Profile::power_kw`]. [`Profile::generate`] returns the
/// recording as is, neither padded nor cut to the period, so the engine sees
/// its true length and can reject a mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredProfile {
    name: &'static str,
    samples: Vec<f64>,
}

impl MeasuredProfile {
    pub fn new(name: &'static str, samples: Vec<f64>) -> Self {
        Self { name, samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Profile for MeasuredProfile {
    fn power_kw(&mut self, context: &SampleContext) -> f64 {
        self.samples.get(context.timestep).copied().unwrap_or(0.0)
    }

    fn profile_type(&self) -> &'static str {
        self.name
    }

    fn generate(&mut self, _clock: &StepClock) -> Vec<f64> {
        self.samples.clone()
    }
}
