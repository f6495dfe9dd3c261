//! End-to-end runs with hand-checked expectations.

mod common;

use approx::assert_abs_diff_eq;
use chrono::Duration;
use nanogrid_sim::SimError;
use nanogrid_sim::profiles::ProfilePair;
use nanogrid_sim::sim::engine::{Engine, run_simulation};
use nanogrid_sim::sim::kpi::KpiSummary;
use nanogrid_sim::sim::params::SimParams;
use nanogrid_sim::sim::types::SimulationConfig;

#[test]
fn pv_only_site_without_peak_hours() {
    let params = SimParams {
        batt_capacity_kwh: 0.0,
        ..common::flat_tariff(200.0, 100.0)
    };
    let cfg = common::config(2, 60, params);
    let out = run_simulation(&cfg, &[100.0, 100.0], &[50.0, 50.0]).expect("run succeeds");

    assert_eq!(out.records.len(), 2);
    for r in &out.records {
        assert_eq!(r.direct_kw, 50.0);
        assert_eq!(r.import_kw, 50.0);
        assert_eq!(r.export_kw, 0.0);
        assert_eq!(r.charge_kw, 0.0);
        assert_eq!(r.discharge_kw, 0.0);
        assert_eq!(r.price, 100.0);
    }

    let k = &out.kpi;
    assert_abs_diff_eq!(k.demand_kwh, 200.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.onsite_gen_kwh, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.onsite_used_kwh, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.import_kwh, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.export_kwh, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.match_rate, 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(k.self_sufficiency, 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(k.self_consumption, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(k.cost_import, 10_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(k.net_cost, 10_000.0, epsilon = 1e-6);
    // 100 kWh at the default 450 g/kWh
    assert_abs_diff_eq!(k.emissions_kg, 45.0, epsilon = 1e-9);
}

#[test]
fn surplus_fills_battery_before_export() {
    let cfg = common::config(1, 60, common::lossless_battery());
    let out = run_simulation(&cfg, &[0.0], &[100.0]).expect("run succeeds");

    let r = &out.records[0];
    assert_abs_diff_eq!(r.charge_kw, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.soc_kwh, 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.export_kw, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.final_soc_kwh, 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.kpi.revenue_export, 50.0 * 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.kpi.net_cost, -3000.0, epsilon = 1e-9);
}

#[test]
fn stored_energy_serves_the_evening() {
    let cfg = common::config(3, 60, common::lossless_battery());
    let out = run_simulation(&cfg, &[0.0, 20.0, 60.0], &[100.0, 0.0, 0.0]).expect("run succeeds");

    // Step 0 stores 50 kWh (SOC 60); step 1 covers 20 kW; step 2 is capped at
    // the 30 kWh left above the floor.
    let soc: Vec<f64> = out.records.iter().map(|r| r.soc_kwh).collect();
    assert_abs_diff_eq!(soc[0], 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(soc[1], 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(soc[2], 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.records[2].discharge_kw, 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.records[2].import_kw, 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.kpi.battery_equivalent_full_cycles, 0.5, epsilon = 1e-9);
}

#[test]
fn empty_profiles_give_empty_run() {
    let cfg = common::config(24, 60, common::default_battery());
    let out = run_simulation(&cfg, &[], &[]).expect("run succeeds");
    assert!(out.records.is_empty());
    assert_eq!(out.kpi, KpiSummary::default());
    assert_abs_diff_eq!(out.final_soc_kwh, 20.0, epsilon = 1e-9);
}

#[test]
fn mismatched_profiles_are_rejected() {
    let cfg = common::config(24, 60, SimParams::default());
    let err = run_simulation(&cfg, &[1.0; 24], &[1.0; 23]).unwrap_err();
    assert!(matches!(err, SimError::ProfileLengthMismatch { demand: 24, pv: 23 }));
    assert!(err.is_caller_error());
}

#[test]
fn nan_parameter_is_rejected() {
    let start = common::ts(common::START);
    let params = SimParams {
        price_peak: f64::NAN,
        ..SimParams::default()
    };
    let err = SimulationConfig::new(start, start + Duration::hours(1), 60, params).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter(ref e) if e.field == "pricePeak"));
}

#[test]
fn fragmented_run_matches_single_run() {
    let params = common::default_battery();
    let whole_cfg = common::config(48, 15, params.clone());
    let profiles = ProfilePair::synthetic(&whole_cfg, 42);
    let whole = run_simulation(&whole_cfg, &profiles.demand_kw, &profiles.pv_kw).expect("whole run");

    let half = whole_cfg.step_count() / 2;
    let start = whole_cfg.period_start();
    let mid = start + Duration::hours(24);
    let first_cfg = SimulationConfig::new(start, mid, 15, params.clone()).expect("valid config");
    let second_cfg = SimulationConfig::new(mid, whole_cfg.period_end(), 15, params).expect("valid config");

    let first = Engine::new(first_cfg)
        .run(&profiles.demand_kw[..half], &profiles.pv_kw[..half])
        .expect("first fragment");
    let second = Engine::new(second_cfg)
        .run_from_soc(first.final_soc_kwh, &profiles.demand_kw[half..], &profiles.pv_kw[half..])
        .expect("second fragment");

    let stitched: Vec<_> = first.records.iter().chain(&second.records).cloned().collect();
    assert_eq!(stitched, whole.records);
    assert_eq!(second.final_soc_kwh, whole.final_soc_kwh);
    assert_abs_diff_eq!(
        first.kpi.import_kwh + second.kpi.import_kwh,
        whole.kpi.import_kwh,
        epsilon = 1e-6
    );
}

#[test]
fn battery_lowers_net_cost() {
    let base_cfg = common::config(7 * 24, 15, SimParams::default());
    let batt_cfg = common::config(7 * 24, 15, common::default_battery());
    let profiles = ProfilePair::synthetic(&base_cfg, 42);

    let base = run_simulation(&base_cfg, &profiles.demand_kw, &profiles.pv_kw).expect("baseline run");
    let batt = run_simulation(&batt_cfg, &profiles.demand_kw, &profiles.pv_kw).expect("battery run");

    assert!(batt.kpi.import_kwh < base.kpi.import_kwh);
    assert!(batt.kpi.self_sufficiency > base.kpi.self_sufficiency);
    assert!(batt.kpi.charge_kwh > 0.0);
}
