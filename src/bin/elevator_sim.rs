//! Interactive elevator bank simulator.
//!
//! Starts a bank of elevators and reads commands from stdin, one per line.
//! Events are printed by a separate thread as they happen, so the prompt
//! never waits for a car.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 3 elevators, floors 0-10, 5 people per car, 1 s/floor, 3 s doors
//! cargo run --bin elevator-sim
//!
//! # Fast, JSON output, direction-aware dispatch
//! cargo run --bin elevator-sim -- --travel-ms 100 --dwell-ms 300 --json --policy direction-aware
//!
//! # More detail
//! RUST_LOG=debug cargo run --bin elevator-sim
//! ```
//!
//! Type `help` at the prompt for the command list.

use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{anyhow, Context};
use clap::Parser;
use crossbeam_channel::Receiver;

use elevator_bank::config::{
    BuildingConfig, Config, DispatchConfig, ElevatorConfig, TimingConfig,
};
use elevator_bank::console::{ConsoleCommand, HELP};
use elevator_bank::{Dispatcher, ElevatorEvent, Floor, PolicyKind};

#[derive(Parser, Debug)]
#[command(name = "elevator-sim")]
#[command(about = "Multi-elevator dispatch simulator")]
struct Cli {
    /// Number of elevators
    #[arg(long, default_value_t = 3)]
    elevators: usize,

    /// Highest floor (floors are 0 to max-floor)
    #[arg(long, default_value_t = 10)]
    max_floor: Floor,

    /// People per elevator
    #[arg(long, default_value_t = 5)]
    capacity: u32,

    /// Milliseconds to travel one floor
    #[arg(long, default_value_t = 1000)]
    travel_ms: u64,

    /// Milliseconds the doors stay open
    #[arg(long, default_value_t = 3000)]
    dwell_ms: u64,

    /// Car selection for `andar` requests: nearest or direction-aware
    #[arg(long, default_value = "nearest")]
    policy: PolicyKind,

    /// Print events and status as JSON lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_building(
                BuildingConfig::default()
                    .with_max_floor(self.max_floor)
                    .with_elevators(self.elevators),
            )
            .with_elevator(ElevatorConfig::default().with_capacity(self.capacity))
            .with_timing(
                TimingConfig::default()
                    .with_travel_ms(self.travel_ms)
                    .with_dwell_ms(self.dwell_ms),
            )
            .with_dispatch(DispatchConfig::default().with_policy(self.policy))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let bank = Dispatcher::builder(cli.config())
        .with_sink(events_tx)
        .start()
        .context("failed to start elevator bank")?;

    let json = cli.json;
    let printer = thread::Builder::new()
        .name("event-printer".into())
        .spawn(move || print_events(events_rx, json))
        .context("failed to spawn event printer")?;

    if !json {
        println!(
            "{} elevator(s), floors 0 to {}, policy {}. Type 'help' for commands.",
            bank.elevators(),
            bank.max_floor(),
            bank.policy_name()
        );
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match ConsoleCommand::from_text(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => handle(&bank, command, json)?,
            Err(e) => eprintln!("{}", e),
        }
    }

    let report = bank.shutdown();
    if !json {
        println!(
            "stopped {} elevator(s), {} pending request(s) abandoned",
            report.joined(),
            report.total_abandoned()
        );
    }

    // Dropping the bank drops the last event sender and ends the printer.
    drop(bank);
    printer
        .join()
        .map_err(|_| anyhow!("event printer panicked"))??;
    Ok(())
}

fn handle(bank: &Dispatcher, command: ConsoleCommand, json: bool) -> anyhow::Result<()> {
    let result = match command {
        ConsoleCommand::Status => return print_status(bank, json),
        ConsoleCommand::Help => {
            println!("{}", HELP);
            return Ok(());
        }
        ConsoleCommand::Quit => return Ok(()),
        ConsoleCommand::Call { floor } => bank.request_floor(None, floor),
        ConsoleCommand::Direct { elevator, floor } => bank.request_floor(Some(elevator), floor),
        ConsoleCommand::Board {
            elevator,
            floor,
            boarding,
            alighting,
        } => bank.exchange(elevator, floor, boarding, alighting),
    };

    match result {
        Ok(assignment) if !json => {
            println!(
                "floor {} assigned to elevator {}",
                assignment.floor, assignment.elevator
            );
        }
        Ok(_) => {}
        Err(e) => eprintln!("error: {}", e),
    }
    Ok(())
}

fn print_status(bank: &Dispatcher, json: bool) -> anyhow::Result<()> {
    let status = bank.status();
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer(&mut out, &status).context("failed to encode status")?;
        writeln!(out)?;
    } else {
        for snapshot in &status {
            writeln!(out, "{}", snapshot)?;
        }
    }
    Ok(())
}

fn print_events(events: Receiver<ElevatorEvent>, json: bool) -> anyhow::Result<()> {
    for event in events {
        if json {
            println!(
                "{}",
                serde_json::to_string(&event).context("failed to encode event")?
            );
        } else {
            println!("{}", event);
        }
    }
    Ok(())
}
