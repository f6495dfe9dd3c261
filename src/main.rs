//! nanogrid-sim entry point: CLI wiring, logging setup and scenario execution.

use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nanogrid_sim::cli::Cli;
use nanogrid_sim::io::export::{export_csv, export_kpi_json};
use nanogrid_sim::sim::engine::Engine;

/// Prints `msg` to stderr and exits with status 1.
fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Load config: --scenario, then --preset, then baseline; overrides on top
    let scenario = cli.load_scenario().unwrap_or_else(|e| fail(e));

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let config = scenario.to_simulation_config().unwrap_or_else(|e| fail(e));
    if config.step_count() > cli.max_steps {
        fail(format!(
            "period has {} steps, more than --max-steps {}",
            config.step_count(),
            cli.max_steps
        ));
    }
    info!(
        start = %config.period_start(),
        end = %config.period_end(),
        step_minutes = config.step_minutes(),
        steps = config.step_count(),
        "scenario loaded"
    );

    let profiles = scenario.load_profiles(&config).unwrap_or_else(|e| fail(e));

    // Build and run
    let engine = Engine::new(config);
    let result = match cli.initial_soc_kwh {
        Some(soc) => engine.run_from_soc(soc, &profiles.demand_kw, &profiles.pv_kw),
        None => engine.run(&profiles.demand_kw, &profiles.pv_kw),
    };
    let output = result.unwrap_or_else(|e| fail(e));

    // Print per-step results
    if !cli.quiet {
        for r in &output.records {
            println!("{r}");
        }
    }

    // Print KPI report
    println!("\n{}", output.kpi);
    println!("Final SoC:             {:.3} kWh", output.final_soc_kwh);

    // Export if requested
    if let Some(ref path) = cli.telemetry_out {
        export_csv(&output.records, path).unwrap_or_else(|e| fail(e));
        info!(path = %path.display(), rows = output.records.len(), "telemetry written");
    }
    if let Some(ref path) = cli.kpi_out {
        export_kpi_json(&output.kpi, path).unwrap_or_else(|e| fail(e));
        info!(path = %path.display(), "KPI summary written");
    }
}
