//! Named numeric knobs of a simulation run.
//!
//! Keys follow the flat parameter-map convention used by callers
//! (`battCapacityKwh`, `pricePeak`, ...). Every key has a default, and an
//! unknown key is an error rather than a silently ignored typo.

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, SimError};

/// Complete parameter set for one run.
///
/// Percentages are expressed in percent (`92.0` means 92 %), hours as
/// hour-of-day values in `[0, 24]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SimParams {
    /// Battery energy capacity (kWh); zero or less means no battery.
    pub batt_capacity_kwh: f64,
    /// Maximum charge power (kW).
    pub batt_pchg_kw: f64,
    /// Maximum discharge power (kW).
    pub batt_pdis_kw: f64,
    /// Round-trip efficiency (%), clamped to `[50, 100]` before use.
    pub batt_rt_eff: f64,
    /// Lower bound of the usable SOC band (% of capacity).
    pub batt_soc_min_pct: f64,
    /// Upper bound of the usable SOC band (% of capacity).
    pub batt_soc_max_pct: f64,
    /// Import price inside the peak windows (currency/kWh).
    pub price_peak: f64,
    /// Import price outside the peak windows (currency/kWh).
    pub price_off: f64,
    /// Export credit (currency/kWh).
    pub feedin: f64,
    /// Grid carbon intensity (g CO2 per kWh imported).
    #[serde(rename = "co2_g_per_kwh")]
    pub co2_g_per_kwh: f64,
    pub peak_start: f64,
    pub peak_end: f64,
    pub peak2_start: f64,
    pub peak2_end: f64,
    /// Synthetic demand: flat base (kW).
    pub load_base_kw: f64,
    /// Synthetic demand: morning pulse amplitude (kW).
    pub load_morning_peak_kw: f64,
    /// Synthetic demand: evening pulse amplitude (kW).
    pub load_evening_peak_kw: f64,
    /// Synthetic demand: multiplicative noise half-range (%).
    pub load_noise_pct: f64,
    /// Synthetic PV: nameplate DC capacity (kW).
    pub pv_kw_dc: f64,
    /// Synthetic PV: worst-case daily weather derate (%).
    pub pv_weather_pct: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            batt_capacity_kwh: 0.0,
            batt_pchg_kw: 0.0,
            batt_pdis_kw: 0.0,
            batt_rt_eff: 92.0,
            batt_soc_min_pct: 10.0,
            batt_soc_max_pct: 90.0,
            price_peak: 220.0,
            price_off: 110.0,
            feedin: 60.0,
            co2_g_per_kwh: 450.0,
            peak_start: 9.0,
            peak_end: 12.0,
            peak2_start: 18.0,
            peak2_end: 21.0,
            load_base_kw: 80.0,
            load_morning_peak_kw: 30.0,
            load_evening_peak_kw: 40.0,
            load_noise_pct: 5.0,
            pv_kw_dc: 120.0,
            pv_weather_pct: 15.0,
        }
    }
}

impl SimParams {
    /// All recognised keys, in documentation order.
    pub const KEYS: &[&str] = &[
        "battCapacityKwh",
        "battPchgKw",
        "battPdisKw",
        "battRtEff",
        "battSocMinPct",
        "battSocMaxPct",
        "pricePeak",
        "priceOff",
        "feedin",
        "co2_g_per_kwh",
        "peakStart",
        "peakEnd",
        "peak2Start",
        "peak2End",
        "loadBaseKw",
        "loadMorningPeakKw",
        "loadEveningPeakKw",
        "loadNoisePct",
        "pvKwDc",
        "pvWeatherPct",
    ];

    /// Builds a parameter set from `(key, value)` pairs on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for an unknown key or for a
    /// value that fails [`SimParams::validate`].
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.set(key, value)?;
        }
        params.validate()?;
        Ok(params)
    }

    /// Parses a flat JSON object such as `{"battCapacityKwh": 100}`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed JSON or unknown keys, and
    /// [`SimError::InvalidParameter`] for out-of-range values.
    pub fn from_json_str(s: &str) -> Result<Self, SimError> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Overrides a single parameter by its map key.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if `key` is not recognised.
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), ParamError> {
        let slot = match key {
            "battCapacityKwh" => &mut self.batt_capacity_kwh,
            "battPchgKw" => &mut self.batt_pchg_kw,
            "battPdisKw" => &mut self.batt_pdis_kw,
            "battRtEff" => &mut self.batt_rt_eff,
            "battSocMinPct" => &mut self.batt_soc_min_pct,
            "battSocMaxPct" => &mut self.batt_soc_max_pct,
            "pricePeak" => &mut self.price_peak,
            "priceOff" => &mut self.price_off,
            "feedin" => &mut self.feedin,
            "co2_g_per_kwh" => &mut self.co2_g_per_kwh,
            "peakStart" => &mut self.peak_start,
            "peakEnd" => &mut self.peak_end,
            "peak2Start" => &mut self.peak2_start,
            "peak2End" => &mut self.peak2_end,
            "loadBaseKw" => &mut self.load_base_kw,
            "loadMorningPeakKw" => &mut self.load_morning_peak_kw,
            "loadEveningPeakKw" => &mut self.load_evening_peak_kw,
            "loadNoisePct" => &mut self.load_noise_pct,
            "pvKwDc" => &mut self.pv_kw_dc,
            "pvWeatherPct" => &mut self.pv_weather_pct,
            _ => {
                return Err(ParamError::new(
                    key,
                    format!("unknown parameter, expected one of: {}", Self::KEYS.join(", ")),
                ));
            }
        };
        *slot = value;
        Ok(())
    }

    fn values(&self) -> [(&'static str, f64); 20] {
        [
            ("battCapacityKwh", self.batt_capacity_kwh),
            ("battPchgKw", self.batt_pchg_kw),
            ("battPdisKw", self.batt_pdis_kw),
            ("battRtEff", self.batt_rt_eff),
            ("battSocMinPct", self.batt_soc_min_pct),
            ("battSocMaxPct", self.batt_soc_max_pct),
            ("pricePeak", self.price_peak),
            ("priceOff", self.price_off),
            ("feedin", self.feedin),
            ("co2_g_per_kwh", self.co2_g_per_kwh),
            ("peakStart", self.peak_start),
            ("peakEnd", self.peak_end),
            ("peak2Start", self.peak2_start),
            ("peak2End", self.peak2_end),
            ("loadBaseKw", self.load_base_kw),
            ("loadMorningPeakKw", self.load_morning_peak_kw),
            ("loadEveningPeakKw", self.load_evening_peak_kw),
            ("loadNoisePct", self.load_noise_pct),
            ("pvKwDc", self.pv_kw_dc),
            ("pvWeatherPct", self.pv_weather_pct),
        ]
    }

    /// Checks every value for finiteness and its documented range.
    ///
    /// Battery capacity is not range-checked: zero or negative capacity
    /// simply disables the battery. Round-trip efficiency is clamped at use.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint; see [`SimParams::violations`]
    /// for all of them.
    pub fn validate(&self) -> Result<(), ParamError> {
        match self.violations().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns every violated constraint, in key order.
    ///
    /// Range checks are skipped while any value is non-finite, so a NaN is
    /// reported once rather than once per rule it breaks.
    pub fn violations(&self) -> Vec<ParamError> {
        let non_finite: Vec<ParamError> = self
            .values()
            .into_iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(key, _)| ParamError::new(key, "must be a finite number"))
            .collect();
        if !non_finite.is_empty() {
            return non_finite;
        }

        let mut errors = Vec::new();
        for (key, value) in [
            ("battPchgKw", self.batt_pchg_kw),
            ("battPdisKw", self.batt_pdis_kw),
            ("co2_g_per_kwh", self.co2_g_per_kwh),
            ("loadBaseKw", self.load_base_kw),
            ("loadMorningPeakKw", self.load_morning_peak_kw),
            ("loadEveningPeakKw", self.load_evening_peak_kw),
            ("pvKwDc", self.pv_kw_dc),
        ] {
            if value < 0.0 {
                errors.push(ParamError::new(key, format!("must be >= 0, got {value}")));
            }
        }

        for (key, value) in [
            ("battSocMinPct", self.batt_soc_min_pct),
            ("battSocMaxPct", self.batt_soc_max_pct),
            ("loadNoisePct", self.load_noise_pct),
            ("pvWeatherPct", self.pv_weather_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(ParamError::new(
                    key,
                    format!("must be in [0, 100], got {value}"),
                ));
            }
        }
        if self.batt_soc_min_pct > self.batt_soc_max_pct {
            errors.push(ParamError::new(
                "battSocMinPct",
                "must be <= battSocMaxPct",
            ));
        }

        errors.extend(check_window("peakStart", self.peak_start, self.peak_end).err());
        errors.extend(check_window("peak2Start", self.peak2_start, self.peak2_end).err());
        errors
    }
}

/// Peak windows are `[start, end)` within one day; `start == end` is empty.
fn check_window(field: &str, start: f64, end: f64) -> Result<(), ParamError> {
    for value in [start, end] {
        if !(0.0..=24.0).contains(&value) {
            return Err(ParamError::new(
                field,
                format!("window bounds must be within [0, 24], got {start}..{end}"),
            ));
        }
    }
    if start > end {
        return Err(ParamError::new(
            field,
            format!("window start must not exceed its end, got {start}..{end}"),
        ));
    }
    Ok(())
}
