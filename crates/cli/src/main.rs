//! pathtrace CLI - offline path checks and trace replays for game tuning.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pathtrace_core::{PathModel, Point, RoundPolicy, RoundReport, ToleranceConfig, TrackEvent};
use pathtrace_cues::{Cue, CuePlayer, CueScheduler};
use pathtrace_engine::{PreparedPath, RoundError, RoundStateMachine};

#[derive(Parser)]
#[command(name = "pathtrace")]
#[command(about = "Path tracing validation for motor-skill games", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a path file
    Check {
        /// Path model JSON
        path: PathBuf,
    },
    /// Replay a recorded scenario through the engine
    Replay {
        /// Scenario JSON
        scenario: PathBuf,
        /// Play feedback cues on the console
        #[arg(long)]
        cues: bool,
        /// Delay before each cue plays
        #[arg(long, default_value = "0")]
        cue_delay_ms: u64,
    },
    /// Print an example scenario
    Sample,
}

/// A recorded round: the path, its settings and the pointer samples.
#[derive(Debug, Serialize, Deserialize)]
struct Scenario {
    path: PathModel,
    #[serde(default)]
    tolerance: ToleranceConfig,
    #[serde(default)]
    policy: RoundPolicy,
    samples: Vec<Sample>,
}

/// One recorded pointer sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Sample {
    Down { x: f64, y: f64, t: u64 },
    Move { x: f64, y: f64, t: u64 },
    Up { t: u64 },
}

/// Prints cues instead of playing them.
struct ConsolePlayer;

#[async_trait]
impl CuePlayer for ConsolePlayer {
    async fn play(&self, cue: &Cue) -> pathtrace_cues::Result<()> {
        println!("  cue: {}", cue.name());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { path } => {
            let model: PathModel = load_json(&path)?;
            let prepared = PreparedPath::new(model)
                .with_context(|| format!("invalid path in {}", path.display()))?;

            println!("Path: {}", path.display());
            println!("  Kind: {}", prepared.model().kind());
            println!("  Length: {:.2}", prepared.length());
            println!("  Loop: {}", prepared.is_loop());
        }
        Commands::Replay { scenario, cues, cue_delay_ms } => {
            let loaded: Scenario = load_json(&scenario)?;
            let mut scheduler = cues.then(|| CueScheduler::new(Arc::new(ConsolePlayer)));
            let delay = Duration::from_millis(cue_delay_ms);

            let report = replay(&loaded, |t, event| {
                println!("t={:>6} {}", t, event.name());
                if let Some(scheduler) = scheduler.as_mut() {
                    if let Err(e) = scheduler.schedule_event(event, delay) {
                        debug!("Cue not scheduled: {}", e);
                    }
                }
            })?;

            if let Some(scheduler) = scheduler.as_mut() {
                while scheduler.pending() > 0 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sample => {
            println!("{}", serde_json::to_string_pretty(&sample_scenario()?)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Feed every sample through a fresh round and return its report.
fn replay(scenario: &Scenario, mut on_event: impl FnMut(u64, &TrackEvent)) -> Result<RoundReport> {
    let mut machine = RoundStateMachine::with_round(
        scenario.path.clone(),
        scenario.tolerance,
        scenario.policy,
    )?;
    info!(
        "Replaying {} samples, corridor {:.1}, {:?}",
        scenario.samples.len(),
        machine.tolerance().corridor_width,
        machine.policy().success
    );

    for sample in &scenario.samples {
        let (t, update) = match *sample {
            Sample::Down { x, y, t } => match machine.pointer_down(Point::new(x, y), t) {
                Ok(update) => (t, update),
                Err(RoundError::AlreadyComplete(_)) => {
                    debug!("Round complete, ignoring remaining samples");
                    break;
                }
                Err(e) => return Err(e.into()),
            },
            Sample::Move { x, y, t } => (t, machine.update(Point::new(x, y), t)),
            Sample::Up { t } => (t, machine.pointer_up(t)),
        };
        for event in &update.events {
            on_event(t, event);
        }
    }

    Ok(machine.report())
}

/// A clean drag along a wavy line.
fn sample_scenario() -> Result<Scenario> {
    let path = PathModel::polyline([
        (20.0, 50.0),
        (27.5, 57.0),
        (35.0, 60.0),
        (42.5, 57.0),
        (50.0, 50.0),
        (57.5, 43.0),
        (65.0, 40.0),
        (72.5, 43.0),
        (80.0, 50.0),
    ]);
    let prepared = PreparedPath::new(path.clone())?;

    const STEPS: u64 = 60;
    const FRAME_MS: u64 = 16;
    let start = prepared.start();
    let mut samples = vec![Sample::Down { x: start.x, y: start.y, t: 0 }];
    for k in 1..=STEPS {
        let p = prepared.point_at(k as f64 / STEPS as f64);
        samples.push(Sample::Move { x: p.x, y: p.y, t: k * FRAME_MS });
    }
    samples.push(Sample::Up { t: (STEPS + 1) * FRAME_MS });

    Ok(Scenario {
        path,
        tolerance: ToleranceConfig::default(),
        policy: RoundPolicy::default(),
        samples,
    })
}
