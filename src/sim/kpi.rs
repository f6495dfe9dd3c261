//! Run-level KPI accumulation and the final summary.

use std::fmt;

use serde::Serialize;

use super::types::TimeStepRecord;

/// Prices and factors the accumulator applies to every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiRates {
    /// Step duration in hours.
    pub dt_hours: f64,
    /// Export credit per kWh.
    pub feedin: f64,
    /// Grid emissions in kg CO2 per kWh imported.
    pub co2_kg_per_kwh: f64,
}

/// Running sums folded across the step sequence.
///
/// All energies are `power_kw * dt_hours`; money and emissions use the price
/// on each record and the rates in [`KpiRates`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiAccumulator {
    pub demand_kwh: f64,
    pub onsite_gen_kwh: f64,
    pub onsite_used_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub charge_kwh: f64,
    pub discharge_kwh: f64,
    pub curtailed_kwh: f64,
    pub cost_import: f64,
    pub revenue_export: f64,
    pub emissions_kg: f64,
    pub peak_import_kw: f64,
    pub peak_export_kw: f64,
}

impl KpiAccumulator {
    /// Returns the sums after adding one step.
    #[must_use]
    pub fn add(self, record: &TimeStepRecord, rates: &KpiRates) -> Self {
        let h = rates.dt_hours;
        Self {
            demand_kwh: self.demand_kwh + record.load_kw * h,
            onsite_gen_kwh: self.onsite_gen_kwh + record.pv_kw * h,
            onsite_used_kwh: self.onsite_used_kwh + (record.direct_kw + record.discharge_kw) * h,
            import_kwh: self.import_kwh + record.import_kw * h,
            export_kwh: self.export_kwh + record.export_kw * h,
            charge_kwh: self.charge_kwh + record.charge_kw * h,
            discharge_kwh: self.discharge_kwh + record.discharge_kw * h,
            curtailed_kwh: self.curtailed_kwh + record.curtail_kw * h,
            cost_import: self.cost_import + record.import_kw * h * record.price,
            revenue_export: self.revenue_export + record.export_kw * h * rates.feedin,
            emissions_kg: self.emissions_kg + record.import_kw * h * rates.co2_kg_per_kwh,
            peak_import_kw: self.peak_import_kw.max(record.import_kw),
            peak_export_kw: self.peak_export_kw.max(record.export_kw),
        }
    }

    /// Derives the ratios and produces the final summary.
    ///
    /// # Arguments
    ///
    /// * `battery_capacity_kwh` - Capacity used for the equivalent-cycle count
    pub fn finish(self, battery_capacity_kwh: f64) -> KpiSummary {
        let match_rate = ratio(self.onsite_used_kwh, self.demand_kwh);
        let cycles = if battery_capacity_kwh > 0.0 {
            (self.charge_kwh + self.discharge_kwh) / (2.0 * battery_capacity_kwh)
        } else {
            0.0
        };

        KpiSummary {
            demand_kwh: self.demand_kwh,
            onsite_gen_kwh: self.onsite_gen_kwh,
            onsite_used_kwh: self.onsite_used_kwh,
            import_kwh: self.import_kwh,
            export_kwh: self.export_kwh,
            charge_kwh: self.charge_kwh,
            discharge_kwh: self.discharge_kwh,
            curtailed_kwh: self.curtailed_kwh,
            match_rate,
            self_sufficiency: match_rate,
            self_consumption: ratio(self.onsite_used_kwh, self.onsite_gen_kwh),
            curtail_ratio: ratio(self.curtailed_kwh, self.onsite_gen_kwh),
            cost_import: self.cost_import,
            revenue_export: self.revenue_export,
            net_cost: self.cost_import - self.revenue_export,
            emissions_kg: self.emissions_kg,
            peak_import_kw: self.peak_import_kw,
            peak_export_kw: self.peak_export_kw,
            battery_equivalent_full_cycles: cycles,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Aggregate key performance indicators of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KpiSummary {
    /// Total site demand (kWh).
    pub demand_kwh: f64,
    /// Total PV generation (kWh).
    pub onsite_gen_kwh: f64,
    /// Demand served on site, directly or from the battery (kWh).
    pub onsite_used_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub charge_kwh: f64,
    pub discharge_kwh: f64,
    pub curtailed_kwh: f64,
    /// Share of demand met on site.
    pub match_rate: f64,
    /// Same as `match_rate`; kept under both names for report consumers.
    pub self_sufficiency: f64,
    /// Share of generation used on site: `(direct + discharge) / generation`.
    ///
    /// Within `[0, 1]` when the battery starts at its minimum. A run resumed
    /// from a higher SOC can discharge energy PV never supplied, so the value
    /// may exceed 1 there.
    pub self_consumption: f64,
    pub curtail_ratio: f64,
    /// Cost of imported energy at time-of-day prices.
    pub cost_import: f64,
    /// Credit for exported energy at the feed-in rate.
    pub revenue_export: f64,
    /// `cost_import - revenue_export`.
    pub net_cost: f64,
    /// Emissions attributed to imported energy (kg CO2).
    pub emissions_kg: f64,
    pub peak_import_kw: f64,
    pub peak_export_kw: f64,
    /// Battery throughput over twice its capacity.
    pub battery_equivalent_full_cycles: f64,
}

impl KpiSummary {
    /// Computes the summary from finished step records.
    pub fn from_records(records: &[TimeStepRecord], rates: &KpiRates, battery_capacity_kwh: f64) -> Self {
        records
            .iter()
            .fold(KpiAccumulator::default(), |acc, r| acc.add(r, rates))
            .finish(battery_capacity_kwh)
    }

    /// Copy rounded for reporting: 3 decimals for energies, powers, ratios
    /// and emissions; 2 decimals for money.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let e = |v: f64| round_to(v, 3);
        let m = |v: f64| round_to(v, 2);
        Self {
            demand_kwh: e(self.demand_kwh),
            onsite_gen_kwh: e(self.onsite_gen_kwh),
            onsite_used_kwh: e(self.onsite_used_kwh),
            import_kwh: e(self.import_kwh),
            export_kwh: e(self.export_kwh),
            charge_kwh: e(self.charge_kwh),
            discharge_kwh: e(self.discharge_kwh),
            curtailed_kwh: e(self.curtailed_kwh),
            match_rate: e(self.match_rate),
            self_sufficiency: e(self.self_sufficiency),
            self_consumption: e(self.self_consumption),
            curtail_ratio: e(self.curtail_ratio),
            cost_import: m(self.cost_import),
            revenue_export: m(self.revenue_export),
            net_cost: m(self.net_cost),
            emissions_kg: e(self.emissions_kg),
            peak_import_kw: e(self.peak_import_kw),
            peak_export_kw: e(self.peak_export_kw),
            battery_equivalent_full_cycles: e(self.battery_equivalent_full_cycles),
        }
    }
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Demand:                {:.3} kWh", self.demand_kwh)?;
        writeln!(f, "On-site generation:    {:.3} kWh", self.onsite_gen_kwh)?;
        writeln!(f, "On-site used:          {:.3} kWh", self.onsite_used_kwh)?;
        writeln!(
            f,
            "Grid import / export:  {:.3} / {:.3} kWh (peak {:.2} / {:.2} kW)",
            self.import_kwh, self.export_kwh, self.peak_import_kw, self.peak_export_kw
        )?;
        writeln!(
            f,
            "Battery charge / dis.: {:.3} / {:.3} kWh ({:.2} equiv. cycles)",
            self.charge_kwh, self.discharge_kwh, self.battery_equivalent_full_cycles
        )?;
        writeln!(f, "Self-sufficiency:      {:.1}%", self.self_sufficiency * 100.0)?;
        writeln!(f, "Self-consumption:      {:.1}%", self.self_consumption * 100.0)?;
        writeln!(f, "Curtailment:           {:.1}%", self.curtail_ratio * 100.0)?;
        writeln!(
            f,
            "Import cost / revenue: {:.2} / {:.2} (net {:.2})",
            self.cost_import, self.revenue_export, self.net_cost
        )?;
        write!(f, "Emissions:             {:.3} kg CO2", self.emissions_kg)
    }
}
