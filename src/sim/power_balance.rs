//! Per-step energy balance between load, PV, battery and grid.

use chrono::{DateTime, FixedOffset};

use super::battery::BatteryState;
use super::types::TimeStepRecord;

/// Resolves one step of the site energy balance.
///
/// PV first serves load directly; its remaining surplus charges the battery
/// and the rest is exported. Load not met directly is served by battery
/// discharge and then by grid import. Curtailment is never needed because
/// export is unconstrained, so it is reported as zero.
///
/// This is a pure function of its inputs: the battery passed in is left
/// untouched and the post-step battery is returned alongside the record.
///
/// # Arguments
///
/// * `battery` - Battery state before the step
/// * `timestamp` - Start of the interval
/// * `load_kw` - Site demand (kW, >= 0)
/// * `pv_kw` - PV generation (kW, >= 0)
/// * `price` - Import price for the interval
/// * `dt_hours` - Step duration in hours
pub fn balance_step(
    battery: BatteryState,
    timestamp: DateTime<FixedOffset>,
    load_kw: f64,
    pv_kw: f64,
    price: f64,
    dt_hours: f64,
) -> (BatteryState, TimeStepRecord) {
    let direct_kw = load_kw.min(pv_kw);
    let surplus_kw = pv_kw - direct_kw;
    let residual_kw = load_kw - direct_kw;

    let (dispatch, battery) = battery.dispatch(surplus_kw, residual_kw, dt_hours);

    let surplus_kw = surplus_kw - dispatch.charge_kw;
    let residual_kw = residual_kw - dispatch.discharge_kw;

    let record = TimeStepRecord {
        timestamp,
        load_kw,
        pv_kw,
        direct_kw,
        soc_kwh: battery.soc_kwh,
        import_kw: residual_kw.max(0.0),
        export_kw: surplus_kw.max(0.0),
        charge_kw: dispatch.charge_kw,
        discharge_kw: dispatch.discharge_kw,
        curtail_kw: 0.0,
        price,
    };
    (battery, record)
}
