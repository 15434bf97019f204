// Meshflow Benchmark Runner — headless scenario validation
// Seedable Poisson traffic, per-tick invariant audit, JSON report
//
// Usage:
//   cargo run --release --bin bench                  # Run all scenarios
//   cargo run --release --bin bench -- --ticks 200   # Shorter runs
//   cargo run --release --bin bench -- BRIDGE        # Filter by name
//   cargo run --release --bin bench -- --seed 42     # Custom seed
//   cargo run --release --bin bench -- --json        # JSON output

mod scenarios;
mod traffic;

use scenarios::{scenarios, Scenario};
use std::time::Instant;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    ticks: Option<u64>,
    seed: u64,
    json: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { ticks: None, seed: 0, json: false, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().ok();
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--json" => {
                cli.json = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| {
                    s.name.to_lowercase().contains(&f_lower)
                        || s.label.to_lowercase().contains(&f_lower)
                })
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Meshflow Benchmark Runner");
    println!("  PRNG: ChaCha8Rng | Base seed: {}", cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!(
        "  {:<30} {:>7} {:>9} {:>8} {:>9} {:>7} {:>7}",
        "Scenario", "Gen", "Deliv%", "AvgLat", "MaxOcc", "Rebuild", "Time"
    );
    println!("  {}", "-".repeat(84));

    let suite_start = Instant::now();
    let mut reports = Vec::new();
    let mut failures = 0;

    for scenario in &to_run {
        let report = scenarios::run(scenario, cli.seed, cli.ticks);
        let status = if report.passed() { "PASS" } else { "FAIL" };
        if !report.passed() {
            failures += 1;
        }
        println!(
            "  {:<30} {:>7} {:>8.1}% {:>8.2} {:>9} {:>7} {:>5}ms  {}",
            report.label,
            report.generated,
            report.delivery_rate,
            report.avg_latency_ticks,
            report.max_occupancy,
            report.table_rebuilds,
            report.elapsed_ms,
            status,
        );
        reports.push(report);
    }

    println!("  {}", "-".repeat(84));
    println!(
        "  {} scenario(s), {} failure(s), {:.1}s total\n",
        reports.len(),
        failures,
        suite_start.elapsed().as_secs_f64()
    );

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("Failed to serialize report: {e}"),
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
