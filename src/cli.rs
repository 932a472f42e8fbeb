use std::env;
use std::io;

use serde::Serialize;
use tracing::warn;

use crate::combat::rng::entropy_seed;
use crate::data::scenario::ScenarioConfig;
use crate::data::validate::ValidationSeverity;
use crate::parallel::WorkerPool;
use crate::server::{self, ServerConfig, DEFAULT_BIND, DEFAULT_ITERATIONS};
use crate::simulator::{simulate_parallel, write_result_csv, CombatSimulator, SimulationResult};

pub const BIND_ENV: &str = "BROADSIDE_BIND";
pub const ITERATIONS_ENV: &str = "BROADSIDE_ITERATIONS";
pub const WORKERS_ENV: &str = "BROADSIDE_WORKERS";

const USAGE: &str = "usage: broadside <serve|simulate|validate>\n  \
    broadside simulate <scenario> [iterations] [--seed N] [--parallel] [--csv]\n  \
    broadside validate <scenario>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Server settings from `BROADSIDE_ITERATIONS` and `BROADSIDE_WORKERS`.
pub fn server_config_from_env() -> ServerConfig {
    ServerConfig {
        default_iterations: default_iterations_from_env(),
        pool: worker_pool_from_env(),
    }
}

fn default_iterations_from_env() -> u32 {
    let raw = env::var(ITERATIONS_ENV).ok();
    match parse_u32_arg(raw.as_ref(), ITERATIONS_ENV, DEFAULT_ITERATIONS) {
        0 => {
            warn!("{ITERATIONS_ENV} must be at least 1, defaulting to {DEFAULT_ITERATIONS}");
            DEFAULT_ITERATIONS
        }
        iterations => iterations,
    }
}

fn worker_pool_from_env() -> WorkerPool {
    let raw = env::var(WORKERS_ENV).ok();
    WorkerPool::with_workers(parse_u64_arg(raw.as_ref(), WORKERS_ENV, 0) as usize)
}

fn handle_serve() -> i32 {
    let bind_addr = env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    match server::run_server(&bind_addr, &server_config_from_env()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Flags and positionals after `simulate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulateArgs {
    pub scenario: Option<String>,
    pub iterations: Option<u32>,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub csv: bool,
}

pub fn parse_simulate_args(args: &[String]) -> SimulateArgs {
    let mut parsed = SimulateArgs::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--parallel" => parsed.parallel = true,
            "--csv" => parsed.csv = true,
            "--seed" => {
                let raw = rest.next();
                parsed.seed = raw.and_then(|value| value.parse().ok());
                if parsed.seed.is_none() {
                    eprintln!("invalid seed '{}', using a random seed", raw.map_or("", String::as_str));
                }
            }
            _ if parsed.scenario.is_none() => parsed.scenario = Some(arg.clone()),
            _ if parsed.iterations.is_none() => {
                parsed.iterations = Some(parse_u32_arg(Some(arg), "iterations", DEFAULT_ITERATIONS));
            }
            _ => eprintln!("ignoring extra argument '{arg}'"),
        }
    }
    parsed
}

#[derive(Debug, Serialize)]
struct SimulateOutput {
    scenario: String,
    iterations: u32,
    seed: u64,
    parallel: bool,
    result: SimulationResult,
}

fn handle_simulate(args: &[String]) -> i32 {
    let parsed = parse_simulate_args(args);
    let Some(path) = parsed.scenario.clone() else {
        eprintln!("usage: broadside simulate <scenario> [iterations] [--seed N] [--parallel] [--csv]");
        return 2;
    };

    let scenario = match ScenarioConfig::load(&path).and_then(ScenarioConfig::validated) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let iterations = parsed
        .iterations
        .or(scenario.iterations)
        .unwrap_or_else(default_iterations_from_env);
    let seed = parsed.seed.or(scenario.seed).unwrap_or_else(entropy_seed);

    let outcome = if parsed.parallel {
        simulate_parallel(&scenario.fleets, iterations, seed, &worker_pool_from_env())
    } else {
        let mut fleets = scenario.build_fleets(seed);
        CombatSimulator.simulate(&mut fleets, iterations)
    };
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            return 1;
        }
    };

    if parsed.csv {
        if let Err(err) = write_result_csv(&result, io::stdout().lock()) {
            eprintln!("failed to write csv: {err}");
            return 1;
        }
        return 0;
    }

    let output = SimulateOutput {
        scenario: path,
        iterations,
        seed,
        parallel: parsed.parallel,
        result,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize simulation result: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: broadside validate <scenario>");
        return 2;
    };

    let scenario = match ScenarioConfig::load(path) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let report = scenario.validate();
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s)",
            report.count(ValidationSeverity::Error)
        );
        return 1;
    }
    println!(
        "validation passed: {path} ({} fleet(s), {} warning(s))",
        scenario.fleets.len(),
        report.count(ValidationSeverity::Warning)
    );
    0
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                warn!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                warn!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
