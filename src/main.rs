//! Stride Quest command line.
//!
//! Replays recorded motion readings through a counting session backed by a
//! JSON file store, and inspects or resets the stored progress.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use stride_quest::{
    JsonFileStore, MissionCatalog, MotionReading, PedometerSession, SessionConfig, SessionUpdate,
    StaticSensor,
};

#[derive(Debug, Parser)]
#[command(name = "stride-quest", version, about = "Gamified pedometer engine")]
struct Cli {
    /// Progress store (JSON object file).
    #[arg(long, default_value = "stride-quest.json")]
    store: PathBuf,

    /// Session tuning (JSON, partial documents allowed).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local time with its UTC offset to use instead of now,
    /// e.g. 2025-05-10T09:00:00+09:00.
    #[arg(long, global = true, value_parser = parse_local_time)]
    now: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Feed JSON-lines motion readings through a counting session.
    Replay {
        /// One reading per line: {"t_ms": 0, "x": 0.1, "y": 0.2, "z": 9.8}
        #[arg(long)]
        input: PathBuf,
    },
    /// Apply the calendar rollover and print the current progress.
    Status,
    /// Zero every counter.
    Reset,
}

#[derive(Debug, Deserialize)]
struct ReplayLine {
    t_ms: u64,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    z: Option<f32>,
}

impl ReplayLine {
    fn reading(&self) -> MotionReading {
        if self.x.is_none() && self.y.is_none() && self.z.is_none() {
            MotionReading::missing()
        } else {
            MotionReading {
                accel: Some([self.x, self.y, self.z]),
            }
        }
    }
}

fn parse_local_time(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}

fn print_update(update: &SessionUpdate) {
    for event in &update.achievements {
        println!(
            "achievement: {:?} (daily {}, weekly {})",
            event.mission, update.ledger.daily_steps, update.ledger.weekly_steps
        );
    }
}

fn print_status(session: &PedometerSession<JsonFileStore>) {
    let ledger = session.ledger();
    println!("daily steps:      {}", ledger.daily_steps);
    println!("weekly steps:     {}", ledger.weekly_steps);
    println!("consecutive days: {}", ledger.consecutive_days);
    match session.current_mission() {
        Some(mission) => println!(
            "current mission:  {} {} ({:.0}%)",
            mission.icon,
            mission.text,
            session.mission_progress() * 100.0
        ),
        None => println!("current mission:  all missions complete"),
    }
    for status in session.bonus_statuses().iter().filter(|s| s.visible) {
        println!(
            "bonus {}:        {}/{}{}",
            status.id,
            status.progress,
            status.goal,
            if status.completed { " done" } else { "" }
        );
    }
}

fn replay(session: &mut PedometerSession<JsonFileStore>, input: &Path) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let mut last_t = 0;
    let mut lines = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid reading", input.display(), index + 1))?;
        last_t = parsed.t_ms;
        lines += 1;
        for update in session.process_reading(&parsed.reading(), parsed.t_ms) {
            debug!(json = ?update.to_json().ok(), "update");
            print_update(&update);
        }
    }
    // Let a celebration that started near the end of the recording finish.
    let grace = session.config().transition_delay_ms;
    if let Some(update) = session.tick(last_t.saturating_add(grace)) {
        print_update(&update);
    }
    info!(lines, "replay finished");
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = cli.now.unwrap_or_else(|| Local::now().fixed_offset());
    let config = load_config(cli.config.as_deref())?;
    let store = JsonFileStore::open(&cli.store)
        .with_context(|| format!("opening store {}", cli.store.display()))?;
    let mut session = PedometerSession::new(config, MissionCatalog::default(), store);

    match cli.command {
        Command::Replay { input } => {
            session.start(&mut StaticSensor::available(), now)?;
            replay(&mut session, &input)?;
            session.stop();
            print_status(&session);
        }
        Command::Status => {
            session.start(&mut StaticSensor::available(), now)?;
            session.stop();
            print_status(&session);
        }
        Command::Reset => {
            session.reset(now);
            println!("progress reset");
        }
    }

    Ok(())
}
