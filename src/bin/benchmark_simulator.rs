//! Run the bout benchmark and optionally append one line to a log file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_simulator
//!   cargo run --release --bin benchmark_simulator -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, gauntlets_per_sec, gauntlets_per_min, bouts_per_sec, fleets).

use std::fs::OpenOptions;
use std::io::Write;
use std::process;
use std::time::{Duration, Instant};

use broadside::combat::MultiBattle;
use broadside::data::ScenarioConfig;

const SCENARIO: &str = include_str!("../../scenarios/skirmish.json");

// Run for at least this long or this many gauntlets
const MIN_DURATION: Duration = Duration::from_millis(2000);
const MIN_GAUNTLETS: u32 = 500;

fn main() {
    let log = std::env::args().any(|a| a == "--log");

    let scenario = match ScenarioConfig::from_json_str(SCENARIO) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("benchmark scenario is invalid: {err}");
            process::exit(1);
        }
    };
    let mut fleets = scenario.build_fleets(7);

    let start = Instant::now();
    let mut gauntlets: u32 = 0;
    let mut bouts: u64 = 0;
    while start.elapsed() < MIN_DURATION || gauntlets < MIN_GAUNTLETS {
        fleets.iter_mut().for_each(|fleet| fleet.reset());
        match MultiBattle::new(&mut fleets) {
            Ok(gauntlet) => bouts += gauntlet.run().bouts.len() as u64,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        }
        gauntlets += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    let gauntlets_per_sec = gauntlets as f64 / elapsed_secs;
    let gauntlets_per_min = gauntlets_per_sec * 60.0;
    let bouts_per_sec = bouts as f64 / elapsed_secs;

    println!("Simulator benchmark ({} fleets/gauntlet):", fleets.len());
    println!("  Gauntlets:     {}", gauntlets);
    println!("  Duration:      {:.2} s", elapsed_secs);
    println!("  Gauntlets/s:   {:.2}", gauntlets_per_sec);
    println!("  Gauntlets/min: {:.2}", gauntlets_per_min);
    println!("  Bouts/s:       {:.2}", bouts_per_sec);

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!(
            "{},{:.4},{:.4},{:.4},{}\n",
            date,
            gauntlets_per_sec,
            gauntlets_per_min,
            bouts_per_sec,
            fleets.len()
        );
        if let Err(err) = append_log("benchmark_log.csv", &line) {
            eprintln!("failed to update benchmark_log.csv: {err}");
            process::exit(1);
        }
        println!("Appended to benchmark_log.csv");
    }
}

fn append_log(path: &str, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
        file.write_all(b"date,gauntlets_per_sec,gauntlets_per_min,bouts_per_sec,fleets\n")?;
    }
    file.write_all(line.as_bytes())?;
    file.flush()
}
