use std::f64::consts::PI;

use chrono::Timelike;

use super::types::{Profile, SampleContext};
use crate::sim::params::SimParams;

const SUNRISE_HOUR: f64 = 6.0;
const SUNSET_HOUR: f64 = 18.0;

/// A synthetic PV generator with a fixed daylight window.
///
/// `PvProfile` produces a half-sine capacity-factor curve between 06:00 and
/// 18:00 local time, scaled by nameplate DC capacity and by a per-day
/// weather derate. The derate is a deterministic function of the day index,
/// so the generator needs no random source.
#[derive(Debug, Clone)]
pub struct PvProfile {
    /// Nameplate DC capacity in kilowatts.
    pub kw_dc: f64,

    /// Worst-case daily derate as a fraction (0.15 = up to 15 % lost).
    pub weather_frac: f64,
}

impl PvProfile {
    /// Creates a new PV generator.
    ///
    /// # Arguments
    ///
    /// * `kw_dc` - Nameplate DC capacity in kilowatts
    /// * `weather_pct` - Worst-case daily weather derate in percent
    pub fn new(kw_dc: f64, weather_pct: f64) -> Self {
        Self {
            kw_dc: kw_dc.max(0.0),
            weather_frac: (weather_pct / 100.0).clamp(0.0, 1.0),
        }
    }

    pub fn from_params(params: &SimParams) -> Self {
        Self::new(params.pv_kw_dc, params.pv_weather_pct)
    }

    /// Multiplier applied to a whole day of output, in `[1 - weather, 1]`.
    pub fn daily_derate(&self, day_index: i64) -> f64 {
        let wave = (day_index as f64 * 1.3).sin();
        1.0 - self.weather_frac * (0.5 - wave * 0.5)
    }
}

/// Clear-sky capacity factor for a fractional local hour.
pub fn capacity_factor(hour: f64) -> f64 {
    if (SUNRISE_HOUR..=SUNSET_HOUR).contains(&hour) {
        (PI * (hour - SUNRISE_HOUR) / (SUNSET_HOUR - SUNRISE_HOUR)).sin()
    } else {
        0.0
    }
}

impl Profile for PvProfile {
    fn power_kw(&mut self, context: &SampleContext) -> f64 {
        let ts = context.timestamp;
        let hour = f64::from(ts.hour()) + f64::from(ts.minute()) / 60.0;
        let kw = self.kw_dc * capacity_factor(hour) * self.daily_derate(context.day_index);
        kw.max(0.0)
    }

    fn profile_type(&self) -> &'static str {
        "SyntheticPV"
    }
}
