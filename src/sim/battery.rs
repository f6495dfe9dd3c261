use super::params::SimParams;
use super::types::SimulationConfig;
use crate::error::ParamError;

/// Efficiencies below this are treated as "this leg cannot move energy".
pub const EFFICIENCY_EPSILON: f64 = 1e-6;

/// Battery storage state carried from one step to the next.
///
/// `BatteryState` holds the physical limits of the battery together with its
/// current state of charge. Dispatch never mutates in place: [`dispatch`]
/// returns the powers actually delivered and the next state, so a run is a
/// fold over the step sequence.
///
/// # Invariant
///
/// `soc_min_kwh <= soc_kwh <= soc_max_kwh` at all times. A battery with zero
/// capacity is absent: every dispatch returns zero power.
///
/// [`dispatch`]: BatteryState::dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    /// Energy capacity in kWh (0 when absent).
    pub capacity_kwh: f64,
    /// Lower edge of the usable band (kWh).
    pub soc_min_kwh: f64,
    /// Upper edge of the usable band (kWh).
    pub soc_max_kwh: f64,
    /// Charge-leg efficiency, `sqrt` of the round-trip efficiency.
    pub charge_efficiency: f64,
    /// Discharge-leg efficiency, `sqrt` of the round-trip efficiency.
    pub discharge_efficiency: f64,
    /// Maximum charge power (kW).
    pub max_charge_kw: f64,
    /// Maximum discharge power (kW).
    pub max_discharge_kw: f64,
    /// Current stored energy (kWh).
    pub soc_kwh: f64,
}

/// Powers delivered by one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dispatch {
    /// Power absorbed from the PV surplus (kW, >= 0).
    pub charge_kw: f64,
    /// Power delivered to the residual load (kW, >= 0).
    pub discharge_kw: f64,
}

impl BatteryState {
    /// Creates a battery at the bottom of its SOC band.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Energy capacity; zero or negative means no battery
    /// * `max_charge_kw` / `max_discharge_kw` - Power limits (kW)
    /// * `round_trip_pct` - Round-trip efficiency in percent, clamped to `[50, 100]`
    /// * `soc_min_pct` / `soc_max_pct` - Usable band in percent of capacity
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if any argument is non-finite or the band is
    /// not `0 <= soc_min_pct <= soc_max_pct <= 100`.
    pub fn new(
        capacity_kwh: f64,
        max_charge_kw: f64,
        max_discharge_kw: f64,
        round_trip_pct: f64,
        soc_min_pct: f64,
        soc_max_pct: f64,
    ) -> Result<Self, ParamError> {
        for (key, value) in [
            ("battCapacityKwh", capacity_kwh),
            ("battPchgKw", max_charge_kw),
            ("battPdisKw", max_discharge_kw),
            ("battRtEff", round_trip_pct),
            ("battSocMinPct", soc_min_pct),
            ("battSocMaxPct", soc_max_pct),
        ] {
            if !value.is_finite() {
                return Err(ParamError::new(key, "must be a finite number"));
            }
        }
        for (key, value) in [("battSocMinPct", soc_min_pct), ("battSocMaxPct", soc_max_pct)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ParamError::new(key, format!("must be in [0, 100], got {value}")));
            }
        }
        if soc_min_pct > soc_max_pct {
            return Err(ParamError::new("battSocMinPct", "must be <= battSocMaxPct"));
        }

        Ok(Self::build(
            capacity_kwh,
            max_charge_kw,
            max_discharge_kw,
            round_trip_pct,
            soc_min_pct,
            soc_max_pct,
        ))
    }

    /// Checked construction from a parameter map.
    ///
    /// # Errors
    ///
    /// See [`BatteryState::new`].
    pub fn from_params(params: &SimParams) -> Result<Self, ParamError> {
        Self::new(
            params.batt_capacity_kwh,
            params.batt_pchg_kw,
            params.batt_pdis_kw,
            params.batt_rt_eff,
            params.batt_soc_min_pct,
            params.batt_soc_max_pct,
        )
    }

    /// Battery for a run configuration, whose parameters were validated when
    /// the configuration was built.
    pub(crate) fn for_config(config: &SimulationConfig) -> Self {
        let p = config.params();
        Self::build(
            p.batt_capacity_kwh,
            p.batt_pchg_kw,
            p.batt_pdis_kw,
            p.batt_rt_eff,
            p.batt_soc_min_pct,
            p.batt_soc_max_pct,
        )
    }

    fn build(
        capacity_kwh: f64,
        max_charge_kw: f64,
        max_discharge_kw: f64,
        round_trip_pct: f64,
        soc_min_pct: f64,
        soc_max_pct: f64,
    ) -> Self {
        let capacity_kwh = capacity_kwh.max(0.0);
        let leg_efficiency = (round_trip_pct / 100.0).clamp(0.5, 1.0).sqrt();
        let soc_min_kwh = capacity_kwh * soc_min_pct / 100.0;
        let soc_max_kwh = capacity_kwh * soc_max_pct / 100.0;

        Self {
            capacity_kwh,
            soc_min_kwh,
            soc_max_kwh,
            charge_efficiency: leg_efficiency,
            discharge_efficiency: leg_efficiency,
            max_charge_kw: max_charge_kw.max(0.0),
            max_discharge_kw: max_discharge_kw.max(0.0),
            soc_kwh: soc_min_kwh,
        }
    }

    /// Returns the same battery holding `soc_kwh`, or `None` if it lies
    /// outside the usable band.
    pub fn with_soc(self, soc_kwh: f64) -> Option<Self> {
        (soc_kwh.is_finite() && (self.soc_min_kwh..=self.soc_max_kwh).contains(&soc_kwh))
            .then_some(Self { soc_kwh, ..self })
    }

    pub fn is_present(&self) -> bool {
        self.capacity_kwh > 0.0
    }

    /// Resolves one step of greedy dispatch.
    ///
    /// Charging absorbs from `surplus_kw` first, then discharging serves
    /// `residual_load_kw`. The two requests act on disjoint flows, so the
    /// order only matters for the SOC the discharge leg sees.
    ///
    /// # Arguments
    ///
    /// * `surplus_kw` - PV power left after serving load directly
    /// * `residual_load_kw` - Load not served directly by PV
    /// * `dt_hours` - Step duration in hours
    ///
    /// # Returns
    ///
    /// The delivered powers and the battery after the step.
    pub fn dispatch(self, surplus_kw: f64, residual_load_kw: f64, dt_hours: f64) -> (Dispatch, Self) {
        if !self.is_present() || dt_hours <= 0.0 {
            return (Dispatch::default(), self);
        }

        let mut soc = self.soc_kwh;

        let charge_request = surplus_kw.min(self.max_charge_kw);
        let charge_room = if self.charge_efficiency > EFFICIENCY_EPSILON {
            (self.soc_max_kwh - soc) / (self.charge_efficiency * dt_hours)
        } else {
            0.0
        };
        let charge_kw = charge_request.min(charge_room).max(0.0);
        soc += self.charge_efficiency * charge_kw * dt_hours;
        soc = soc.max(self.soc_min_kwh).min(self.soc_max_kwh);

        let discharge_request = residual_load_kw.min(self.max_discharge_kw);
        let discharge_room = if self.discharge_efficiency > EFFICIENCY_EPSILON {
            (soc - self.soc_min_kwh) * self.discharge_efficiency / dt_hours
        } else {
            0.0
        };
        let discharge_kw = discharge_request.min(discharge_room).max(0.0);
        if discharge_kw > 0.0 {
            soc -= discharge_kw / self.discharge_efficiency * dt_hours;
        }
        soc = soc.max(self.soc_min_kwh).min(self.soc_max_kwh);

        (
            Dispatch {
                charge_kw,
                discharge_kw,
            },
            Self {
                soc_kwh: soc,
                ..self
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn lossless(capacity_kwh: f64, limit_kw: f64) -> BatteryState {
        BatteryState::new(capacity_kwh, limit_kw, limit_kw, 100.0, 10.0, 90.0).expect("valid battery")
    }

    #[test]
    fn new_battery_starts_at_band_floor() {
        let battery = BatteryState::new(100.0, 50.0, 40.0, 92.0, 10.0, 90.0).expect("valid battery");
        assert_eq!(battery.soc_min_kwh, 10.0);
        assert_eq!(battery.soc_max_kwh, 90.0);
        assert_eq!(battery.soc_kwh, 10.0);
        assert_abs_diff_eq!(battery.charge_efficiency, 0.92_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(battery.charge_efficiency, battery.discharge_efficiency);
    }

    #[test]
    fn round_trip_efficiency_is_clamped() {
        let low = BatteryState::new(10.0, 1.0, 1.0, 20.0, 0.0, 100.0).expect("valid battery");
        assert_abs_diff_eq!(low.charge_efficiency, 0.5_f64.sqrt(), epsilon = 1e-12);
        let high = BatteryState::new(10.0, 1.0, 1.0, 140.0, 0.0, 100.0).expect("valid battery");
        assert_eq!(high.charge_efficiency, 1.0);
    }

    #[test]
    fn negative_capacity_means_absent() {
        let battery = BatteryState::new(-10.0, 5.0, 5.0, 92.0, 10.0, 90.0).expect("valid battery");
        assert!(!battery.is_present());
        assert_eq!(battery.soc_kwh, 0.0);
    }

    #[test]
    fn absent_battery_never_moves_energy() {
        let battery = BatteryState::new(0.0, 50.0, 50.0, 92.0, 10.0, 90.0).expect("valid battery");
        let (d, next) = battery.dispatch(100.0, 100.0, 1.0);
        assert_eq!(d, Dispatch::default());
        assert_eq!(next, battery);
    }

    #[test]
    fn charge_is_limited_by_power() {
        let (d, next) = lossless(100.0, 50.0).dispatch(100.0, 0.0, 1.0);
        assert_eq!(d.charge_kw, 50.0);
        assert_eq!(d.discharge_kw, 0.0);
        assert_abs_diff_eq!(next.soc_kwh, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn charge_is_limited_by_headroom() {
        let battery = lossless(100.0, 50.0).with_soc(80.0).expect("within band");
        let (d, next) = battery.dispatch(100.0, 0.0, 1.0);
        assert_abs_diff_eq!(d.charge_kw, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(next.soc_kwh, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn discharge_is_limited_by_stored_energy() {
        // 4 kWh above the floor over a 15 minute step allows 16 kW.
        let battery = lossless(100.0, 50.0).with_soc(14.0).expect("within band");
        let (d, next) = battery.dispatch(0.0, 30.0, 0.25);
        assert_abs_diff_eq!(d.discharge_kw, 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(next.soc_kwh, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn losses_apply_on_both_legs() {
        // 81 % round trip gives 0.9 per leg.
        let battery = BatteryState::new(100.0, 10.0, 10.0, 81.0, 0.0, 100.0).expect("valid battery");
        let (_, charged) = battery.dispatch(10.0, 0.0, 1.0);
        assert_abs_diff_eq!(charged.soc_kwh, 9.0, epsilon = 1e-9);

        let (d, drained) = charged.dispatch(0.0, 5.0, 1.0);
        assert_abs_diff_eq!(d.discharge_kw, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(drained.soc_kwh, 9.0 - 5.0 / 0.9, epsilon = 1e-9);
    }

    #[test]
    fn surplus_charged_in_a_step_can_serve_residual_load() {
        let battery = lossless(100.0, 50.0);
        let (d, next) = battery.dispatch(20.0, 30.0, 1.0);
        assert_eq!(d.charge_kw, 20.0);
        assert_eq!(d.discharge_kw, 20.0);
        assert_abs_diff_eq!(next.soc_kwh, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn with_soc_rejects_values_outside_band() {
        let battery = lossless(100.0, 50.0);
        assert!(battery.with_soc(5.0).is_none());
        assert!(battery.with_soc(95.0).is_none());
        assert!(battery.with_soc(f64::NAN).is_none());
        assert!(battery.with_soc(50.0).is_some());
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = BatteryState::new(100.0, 10.0, 10.0, 92.0, 90.0, 10.0).unwrap_err();
        assert_eq!(err.field, "battSocMinPct");
    }

    #[test]
    fn nan_band_is_rejected() {
        assert!(BatteryState::new(100.0, 10.0, 10.0, 92.0, f64::NAN, 90.0).is_err());
        assert!(BatteryState::new(100.0, 10.0, 10.0, 92.0, 10.0, f64::NAN).is_err());
        assert!(BatteryState::new(100.0, f64::INFINITY, 10.0, 92.0, 10.0, 90.0).is_err());
    }

    #[test]
    fn from_params_checks_the_band() {
        let params = SimParams {
            batt_capacity_kwh: 100.0,
            batt_soc_min_pct: 95.0,
            batt_soc_max_pct: 5.0,
            ..SimParams::default()
        };
        assert!(BatteryState::from_params(&params).is_err());
        assert!(BatteryState::from_params(&SimParams::default()).is_ok());
    }

    #[test]
    fn dispatch_does_not_panic_on_a_hand_built_inverted_band() {
        let battery = BatteryState {
            soc_min_kwh: 90.0,
            soc_max_kwh: 10.0,
            ..lossless(100.0, 10.0)
        };
        let (_, next) = battery.dispatch(5.0, 0.0, 1.0);
        assert!(next.soc_kwh.is_finite());
    }

    #[test]
    fn soc_stays_in_band_over_cycles() {
        let mut battery = BatteryState::new(50.0, 30.0, 30.0, 92.0, 20.0, 80.0).expect("valid battery");
        for t in 0..200 {
            let surplus = if t % 3 == 0 { 45.0 } else { 0.0 };
            let residual = if t % 2 == 0 { 37.0 } else { 3.0 };
            let (d, next) = battery.dispatch(surplus, residual, 0.5);
            assert!(d.charge_kw >= 0.0 && d.charge_kw <= 30.0);
            assert!(d.discharge_kw >= 0.0 && d.discharge_kw <= 30.0);
            assert!(next.soc_kwh >= next.soc_min_kwh && next.soc_kwh <= next.soc_max_kwh);
            battery = next;
        }
    }
}
