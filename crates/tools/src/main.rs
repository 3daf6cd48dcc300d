use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foundation::time::{Clock, ManualClock, Time};
use runtime::event_bus::HostEvent;
use runtime::metrics::MetricsSnapshot;
use runtime::quality::{QualitySettings, QualityTier};
use scene::picking::{Intersection, PickBackend, PickCandidates, Pointer, Ray};
use serde::Serialize;
use session::{GlobeConfig, GlobeSession, LoadState};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "globe-sim", about = "Headless tools for the activity globe")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a dataset and report what survives validation.
    Inspect {
        data: PathBuf,
    },
    /// Run the frame loop without a renderer and print a JSON summary.
    Simulate {
        data: PathBuf,
        /// Dataset used when the primary one is unusable.
        #[arg(long)]
        fallback: Option<PathBuf>,
        /// Globe configuration as JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// Simulated frame rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        /// Overrides the configured shuffle seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Inspect { data } => cmd_inspect(&data),
        Command::Simulate {
            data,
            fallback,
            config,
            frames,
            fps,
            seed,
        } => {
            let mut config = match config {
                Some(path) => GlobeConfig::from_json(&read(&path)?).map_err(|e| e.to_string())?,
                None => GlobeConfig::default(),
            };
            if seed.is_some() {
                config.shuffle_seed = seed;
            }
            let primary = read(&data)?;
            let fallback = fallback.as_deref().map(read).transpose()?;
            let summary = simulate(config, &primary, fallback.as_deref(), frames, fps)?;
            print_json(&summary)
        }
    }
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct InspectReport {
    records: usize,
    dropped: usize,
    same_location: usize,
    languages: BTreeMap<String, usize>,
}

fn cmd_inspect(path: &Path) -> Result<(), String> {
    let parsed = formats::parse_records(&read(path)?).map_err(|e| e.to_string())?;
    let mut languages = BTreeMap::new();
    for r in &parsed.records {
        let lang = r.language.clone().unwrap_or_else(|| "unknown".to_string());
        *languages.entry(lang).or_insert(0) += 1;
    }
    print_json(&InspectReport {
        records: parsed.records.len(),
        same_location: parsed.records.iter().filter(|r| r.is_same_location()).count(),
        dropped: parsed.dropped,
        languages,
    })
}

/// Renderer stand-in: a manual clock and no hit testing.
#[derive(Debug, Default)]
struct SimHost {
    clock: ManualClock,
}

impl Clock for SimHost {
    fn now(&self) -> Time {
        self.clock.now()
    }
}

impl PickBackend for SimHost {
    fn screen_ray(&self, _pointer: &Pointer) -> Option<Ray> {
        None
    }

    fn intersect(&self, _ray: &Ray, _candidates: &PickCandidates, _out: &mut Vec<Intersection>) {}
}

#[derive(Debug, Serialize)]
struct SimSummary {
    load_state: LoadState,
    frames: u64,
    records: usize,
    tier: QualityTier,
    settings: QualitySettings,
    disposed: bool,
    events: Vec<String>,
    metrics: MetricsSnapshot,
}

fn simulate(
    config: GlobeConfig,
    primary: &str,
    fallback: Option<&str>,
    frames: u64,
    fps: f64,
) -> Result<SimSummary, String> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(format!("fps must be positive, got {fps}"));
    }
    let dt = 1.0 / fps;
    let mut session = GlobeSession::new(config, SimHost::default());
    session.start().map_err(|e| e.to_string())?;
    session.assets_loaded().map_err(|e| e.to_string())?;
    let mut state = session.data_loaded(primary).map_err(|e| e.to_string())?;
    if !state.is_terminal() {
        state = match fallback {
            Some(payload) => session.data_loaded(payload),
            None => session.data_failed("no fallback dataset given"),
        }
        .map_err(|e| e.to_string())?;
    }
    tracing::info!(?state, frames, fps, "simulating");

    let mut ticked = 0;
    for _ in 0..frames {
        if session.is_disposed() {
            break;
        }
        session.host_mut().clock.advance(dt);
        if session.tick(dt).is_some() {
            ticked += 1;
        }
    }

    let events = session
        .drain_events()
        .iter()
        .map(|e| format!("{}: {}", e.frame_index, describe(&e.event)))
        .collect();
    Ok(SimSummary {
        load_state: session.load_state(),
        frames: ticked,
        records: session.loaded().map(|g| g.sequence.len()).unwrap_or(0),
        tier: session.tier(),
        settings: session.settings(),
        disposed: session.is_disposed(),
        events,
        metrics: session.metrics().snapshot(),
    })
}

fn describe(event: &HostEvent) -> String {
    match event {
        HostEvent::Ready { records } => format!("ready ({records} records)"),
        HostEvent::QualityChanged { tier, .. } => format!("quality -> {tier:?}"),
        HostEvent::Paused => "paused".to_string(),
        HostEvent::Resumed => "resumed".to_string(),
        HostEvent::Fallback(reason) => format!("fallback: {reason}"),
        HostEvent::Disposed => "disposed".to_string(),
    }
}
