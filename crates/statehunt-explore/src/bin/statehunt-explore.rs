//! CLI binary for the statehunt exploration engine.
//!
//! Drives the sample RERS-style target through a breadth-first hunt, a
//! random-walk fuzz run, or a single targeted probe.
//!
//! # Usage
//!
//! ```bash
//! # Full session: BFS then random walk, human-readable report
//! statehunt-explore hunt
//!
//! # Tighter limits, coarse fingerprints, JSON report on stdout
//! statehunt-explore hunt --max-depth 8 --max-states 1000 --granularity coarse --json
//!
//! # Start from a config file and override one option
//! statehunt-explore hunt --config run.json --seed 7
//!
//! # Random walk only
//! statehunt-explore fuzz --rounds 500 --steps 100
//!
//! # Replay a history, step one symbol, check the result
//! statehunt-explore probe --history 6,5,6 --symbol 5 --expect-failure error_1
//! statehunt-explore probe --symbol 6 --expect-value 25 --expect-component 0=1
//! ```
//!
//! A `--config` file holds the run options plus an optional
//! `"granularity"`; explicit flags override it.
//!
//! `hunt` exits with status 1 when bugs were found or the random walk hit
//! an adapter error, `probe` when an expectation did not hold.

use clap::{Parser, Subcommand};
use statehunt_explore::config::{RunConfig, SampleRunConfig};
use statehunt_explore::fuzz::RandomWalkFuzzer;
use statehunt_explore::history::History;
use statehunt_explore::probe::TargetedProbe;
use statehunt_explore::replay::ReplayEngine;
use statehunt_explore::report::{format_fuzz, format_report};
use statehunt_explore::session::run_session;
use statehunt_target::{Granularity, Outcome, RersMachine};

#[derive(Parser)]
#[command(name = "statehunt-explore")]
#[command(about = "Breadth-first state-space exploration for reactive targets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full session: breadth-first hunt, then random walk.
    Hunt {
        /// JSON run configuration; flags override its values.
        #[arg(short, long)]
        config: Option<String>,

        /// Histories longer than this are not expanded.
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Upper bound on distinct visited states.
        #[arg(short = 'm', long)]
        max_states: Option<usize>,

        /// Random-walk rounds.
        #[arg(short, long)]
        rounds: Option<u64>,

        /// Random-walk steps per round.
        #[arg(long)]
        steps: Option<u64>,

        /// Random-walk seed.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Fingerprint granularity: "full", "coarse" or "extended".
        /// Defaults to the config file's value, then "full".
        #[arg(short, long)]
        granularity: Option<String>,

        /// Print the report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Run only the random-walk fuzzer.
    Fuzz {
        /// JSON run configuration; flags override its values.
        #[arg(short, long)]
        config: Option<String>,

        /// Random-walk rounds.
        #[arg(short, long)]
        rounds: Option<u64>,

        /// Random-walk steps per round.
        #[arg(long)]
        steps: Option<u64>,

        /// Random-walk seed.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Replay a history, step one symbol and print the result.
    Probe {
        /// Comma-separated input history, e.g. "6,5,6". Empty for the
        /// initial state.
        #[arg(long, default_value = "")]
        history: String,

        /// Symbol to step after the history.
        #[arg(long)]
        symbol: i32,

        /// Expected output value.
        #[arg(long, conflicts_with = "expect_failure")]
        expect_value: Option<i64>,

        /// Expected failure message.
        #[arg(long)]
        expect_failure: Option<String>,

        /// Expected fingerprint component as INDEX=VALUE. Repeatable.
        #[arg(long)]
        expect_component: Vec<String>,

        /// Fingerprint granularity: "full", "coarse" or "extended".
        #[arg(short, long, default_value = "full")]
        granularity: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hunt {
            config,
            max_depth,
            max_states,
            rounds,
            steps,
            seed,
            granularity,
            json,
        } => cmd_hunt(
            config,
            max_depth,
            max_states,
            rounds,
            steps,
            seed,
            granularity,
            json,
        ),
        Commands::Fuzz {
            config,
            rounds,
            steps,
            seed,
        } => cmd_fuzz(config, rounds, steps, seed),
        Commands::Probe {
            history,
            symbol,
            expect_value,
            expect_failure,
            expect_component,
            granularity,
        } => cmd_probe(
            history,
            symbol,
            expect_value,
            expect_failure,
            expect_component,
            granularity,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_hunt(
    config_path: Option<String>,
    max_depth: Option<usize>,
    max_states: Option<usize>,
    rounds: Option<u64>,
    steps: Option<u64>,
    seed: Option<u64>,
    granularity: Option<String>,
    json: bool,
) {
    let SampleRunConfig {
        run: mut config,
        granularity: file_granularity,
    } = load_config(config_path.as_deref());
    let granularity = match granularity {
        Some(s) => parse_granularity(&s),
        None => file_granularity,
    };
    if let Some(max_depth) = max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max_states) = max_states {
        config.max_states = max_states;
    }
    apply_fuzz_overrides(&mut config, rounds, steps, seed);

    eprintln!("═══════════════════════════════════════════════════════════════════════");
    eprintln!("  statehunt Exploration");
    eprintln!("═══════════════════════════════════════════════════════════════════════");
    eprintln!();
    eprintln!("Configuration:");
    eprintln!("  Alphabet:       {:?}", config.input_alphabet);
    eprintln!("  Max depth:      {}", config.max_depth);
    eprintln!("  Max states:     {}", config.max_states);
    eprintln!("  Granularity:    {}", granularity);
    eprintln!(
        "  Random walk:    {} rounds x {} steps (seed {})",
        config.fuzz_rounds, config.fuzz_steps_per_round, config.fuzz_seed
    );
    eprintln!();
    eprintln!("Starting exploration...");
    eprintln!();

    let mut machine = RersMachine::new(granularity);
    let report = match run_session(&mut machine, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Session failed: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", format_report(&report));
    }

    if let Some(error) = &report.fuzz_error {
        eprintln!("Random walk aborted: {}", error);
        std::process::exit(1);
    }
    if report.unique_bugs() > 0 {
        std::process::exit(1);
    }
}

fn cmd_fuzz(config_path: Option<String>, rounds: Option<u64>, steps: Option<u64>, seed: Option<u64>) {
    let SampleRunConfig {
        run: mut config,
        granularity,
    } = load_config(config_path.as_deref());
    apply_fuzz_overrides(&mut config, rounds, steps, seed);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut machine = RersMachine::new(granularity);
    let report = match RandomWalkFuzzer::from_config(&config).run(&mut machine, &config.input_alphabet)
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Fuzzing failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("─── Random Walk ───────────────────────────────────────────────────────");
    print!("{}", format_fuzz(&report));
}

fn cmd_probe(
    history: String,
    symbol: i32,
    expect_value: Option<i64>,
    expect_failure: Option<String>,
    expect_component: Vec<String>,
    granularity: String,
) {
    let granularity = parse_granularity(&granularity);
    let history = match parse_history(&history) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut probe = TargetedProbe::new("cli", history, symbol);
    if let Some(value) = expect_value {
        probe = probe.expect_outcome(Outcome::Value(value));
    }
    if let Some(message) = expect_failure {
        probe = probe.expect_outcome(Outcome::Failure(message));
    }
    for raw in &expect_component {
        match parse_component(raw) {
            Ok((index, value)) => probe = probe.expect_component(index, value),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut replay = ReplayEngine::new(RersMachine::new(granularity));
    match probe.run(&mut replay) {
        Ok(result) => {
            println!("History:      {}", probe.history);
            println!("Symbol:       {}", probe.symbol);
            println!("Outcome:      {}", result.outcome);
            println!("Fingerprint:  {}", result.key);
            println!("State:        {}", replay.describe());
        }
        Err(e) => {
            eprintln!("Probe failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Defaults, then the config file if one was given.
fn load_config(path: Option<&str>) -> SampleRunConfig {
    match path {
        Some(path) => match SampleRunConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SampleRunConfig::default(),
    }
}

fn apply_fuzz_overrides(
    config: &mut RunConfig<i32>,
    rounds: Option<u64>,
    steps: Option<u64>,
    seed: Option<u64>,
) {
    if let Some(rounds) = rounds {
        config.fuzz_rounds = rounds;
    }
    if let Some(steps) = steps {
        config.fuzz_steps_per_round = steps;
    }
    if let Some(seed) = seed {
        config.fuzz_seed = seed;
    }
}

fn parse_granularity(s: &str) -> Granularity {
    match s.parse() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_history(s: &str) -> Result<History<i32>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(History::empty());
    }
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid history symbol '{}': {}", part.trim(), e))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(History::from_symbols)
}

fn parse_component(s: &str) -> Result<(usize, i64), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid component '{}': expected INDEX=VALUE", s))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("invalid component index '{}': {}", index, e))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid component value '{}': {}", value, e))?;
    Ok((index, value))
}
