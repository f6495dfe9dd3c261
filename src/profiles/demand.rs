use chrono::{Datelike, Timelike, Weekday};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::types::{Profile, SampleContext};
use crate::sim::params::SimParams;

/// Weekend demand relative to a weekday.
const WEEKEND_FACTOR: f64 = 0.9;

/// Morning pulse: centre and half width in hours.
const MORNING_PEAK: (f64, f64) = (8.5, 1.5);
/// Evening pulse: centre and half width in hours.
const EVENING_PEAK: (f64, f64) = (20.0, 2.0);

/// A synthetic site demand generator.
///
/// `DemandProfile` models commercial-style consumption as a flat base with a
/// triangular morning pulse and a larger evening pulse, reduced on weekends
/// and perturbed by uniform multiplicative noise.
///
/// # Examples
///
/// ```
/// use nanogrid_sim::profiles::{DemandProfile, Profile};
/// use nanogrid_sim::profiles::types::SampleContext;
/// use chrono::DateTime;
///
/// // No noise: fully deterministic
/// let mut load = DemandProfile::new(80.0, 30.0, 40.0, 0.0, 42);
///
/// // Monday 20:00 sits on the evening peak
/// let ts = DateTime::parse_from_rfc3339("2025-06-02T20:00:00+09:00").unwrap();
/// let kw = load.power_kw(&SampleContext::new(0, ts, 0));
/// assert_eq!(kw, 120.0);
/// ```
#[derive(Debug, Clone)]
pub struct DemandProfile {
    /// Flat base consumption in kilowatts
    pub base_kw: f64,

    /// Height of the morning pulse in kilowatts
    pub morning_peak_kw: f64,

    /// Height of the evening pulse in kilowatts
    pub evening_peak_kw: f64,

    /// Noise half-range as a fraction (0.05 = +/-5 %)
    pub noise_frac: f64,

    /// Seed the noise generator was created from
    seed: u64,

    /// Random number generator for noise generation
    rng: StdRng,
}

impl DemandProfile {
    /// Creates a new demand generator.
    ///
    /// # Arguments
    ///
    /// * `base_kw` - Flat base consumption in kilowatts
    /// * `morning_peak_kw` - Amplitude of the 07:00-10:00 pulse
    /// * `evening_peak_kw` - Amplitude of the 18:00-22:00 pulse
    /// * `noise_pct` - Multiplicative noise half-range in percent
    /// * `seed` - Random seed for reproducible noise
    pub fn new(
        base_kw: f64,
        morning_peak_kw: f64,
        evening_peak_kw: f64,
        noise_pct: f64,
        seed: u64,
    ) -> Self {
        Self {
            base_kw: base_kw.max(0.0),
            morning_peak_kw: morning_peak_kw.max(0.0),
            evening_peak_kw: evening_peak_kw.max(0.0),
            noise_frac: (noise_pct / 100.0).clamp(0.0, 1.0),
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_params(params: &SimParams, seed: u64) -> Self {
        Self::new(
            params.load_base_kw,
            params.load_morning_peak_kw,
            params.load_evening_peak_kw,
            params.load_noise_pct,
            seed,
        )
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Noise-free demand for a given hour and day type.
    pub fn shape_kw(&self, hour: u32, weekend: bool) -> f64 {
        let h = f64::from(hour);
        let kw = self.base_kw
            + triangular_pulse(h, self.morning_peak_kw, MORNING_PEAK)
            + triangular_pulse(h, self.evening_peak_kw, EVENING_PEAK);
        if weekend { kw * WEEKEND_FACTOR } else { kw }
    }
}

/// `amplitude * (1 - |hour - centre| / half_width)` inside the window, else 0.
fn triangular_pulse(hour: f64, amplitude: f64, (centre, half_width): (f64, f64)) -> f64 {
    let distance = (hour - centre).abs();
    if distance <= half_width {
        amplitude * (1.0 - distance / half_width)
    } else {
        0.0
    }
}

impl Profile for DemandProfile {
    /// Demand at the step's local hour, with one noise draw per call.
    fn power_kw(&mut self, context: &SampleContext) -> f64 {
        let weekend = matches!(context.timestamp.weekday(), Weekday::Sat | Weekday::Sun);
        let kw = self.shape_kw(context.timestamp.hour(), weekend);

        let noise_mult = if self.noise_frac > 0.0 {
            1.0 + self.rng.random_range(-1.0..=1.0) * self.noise_frac
        } else {
            1.0
        };
        (kw * noise_mult).max(0.0)
    }

    fn profile_type(&self) -> &'static str {
        "SyntheticDemand"
    }
}
