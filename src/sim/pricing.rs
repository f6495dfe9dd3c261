//! Time-of-day import tariff with two peak windows.

use super::params::SimParams;

/// Two-level tariff: peak price inside either window, off-peak price elsewhere.
///
/// Windows are half-open `[start, end)` in hours of the local day.
///
/// # Examples
///
/// ```
/// use nanogrid_sim::sim::pricing::Tariff;
///
/// let tariff = Tariff::new(220.0, 110.0, (9.0, 12.0), (18.0, 21.0));
/// assert_eq!(tariff.price_at(9), 220.0);
/// assert_eq!(tariff.price_at(12), 110.0);
/// assert_eq!(tariff.price_at(20), 220.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    pub price_peak: f64,
    pub price_off: f64,
    pub peak: (f64, f64),
    pub peak2: (f64, f64),
}

impl Tariff {
    pub fn new(price_peak: f64, price_off: f64, peak: (f64, f64), peak2: (f64, f64)) -> Self {
        Self {
            price_peak,
            price_off,
            peak,
            peak2,
        }
    }

    pub fn from_params(params: &SimParams) -> Self {
        Self::new(
            params.price_peak,
            params.price_off,
            (params.peak_start, params.peak_end),
            (params.peak2_start, params.peak2_end),
        )
    }

    /// Whether `hour` falls inside either peak window.
    pub fn is_peak(&self, hour: u32) -> bool {
        let h = f64::from(hour);
        let within = |(start, end): (f64, f64)| start <= h && h < end;
        within(self.peak) || within(self.peak2)
    }

    /// Import price for an hour of the day (0–23).
    pub fn price_at(&self, hour: u32) -> f64 {
        if self.is_peak(hour) {
            self.price_peak
        } else {
            self.price_off
        }
    }
}
