// tunnel-sim: headless play-through of a chart.
//
// Drives a simulated polling video player and a mock wall clock at a fixed
// frame rate, optionally with autoplay, and prints the final score as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use tunnel_model::Note;
use tunnel_play::{Autoplay, AutoplayMode, NullPresenter, PlayConfig, PlaySession};
use tunnel_timing::{MockWallClock, PollingVideoSource, WallClock};

/// Wall time simulated past the last note before giving up.
const TAIL_MS: f64 = 10_000.0;

#[derive(Parser, Debug)]
#[command(name = "tunnel-sim", about = "Headless rhythm chart simulator")]
struct Args {
    /// Chart JSON: an array of notes.
    #[arg(long)]
    chart: PathBuf,

    /// Play config JSON. Defaults are used when omitted.
    #[arg(long, env = "TUNNEL_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// How often the simulated video player refreshes its reported time.
    #[arg(long, default_value_t = 50.0)]
    poll_interval_ms: f64,

    /// Wall time before the video player reports anything.
    #[arg(long, default_value_t = 0.0)]
    startup_delay_ms: f64,

    /// Let every note run out instead of playing it.
    #[arg(long)]
    no_autoplay: bool,
}

fn load_chart(path: &Path) -> Result<Vec<Note>> {
    let data =
        std::fs::read_to_string(path).with_context(|| format!("reading chart {}", path.display()))?;
    let notes: Vec<Note> =
        serde_json::from_str(&data).with_context(|| format!("parsing chart {}", path.display()))?;
    Ok(notes)
}

fn chart_end_ms(notes: &[Note]) -> f64 {
    notes
        .iter()
        .filter(|n| n.is_well_formed())
        .map(|n| n.time + n.duration().unwrap_or(0.0))
        .fold(0.0, f64::max)
}

struct SimOptions {
    fps: u32,
    poll_interval_ms: f64,
    startup_delay_ms: f64,
    autoplay: AutoplayMode,
}

/// Play `notes` to the end and return the finished session.
fn simulate(notes: Vec<Note>, config: PlayConfig, options: &SimOptions) -> PlaySession {
    let frame_ms = 1000.0 / f64::from(options.fps.max(1));
    let end_ms = chart_end_ms(&notes) + TAIL_MS;

    let mut autoplay = Autoplay::new(options.autoplay, &notes);
    let mut session = PlaySession::new(notes, config);
    let mut video = PollingVideoSource::new(options.poll_interval_ms)
        .with_startup_delay(options.startup_delay_ms);
    let wall = MockWallClock::new();
    let mut presenter = NullPresenter;

    session.start(wall.now_ms());
    let mut frames = 0u64;
    while !session.phase().is_finished() && wall.now_ms() < end_ms {
        wall.advance(frame_ms);
        video.advance(frame_ms);
        if session.run_frame(&mut video, &wall, &mut presenter) {
            frames += 1;
        }
        autoplay.update(&mut session);
    }

    info!(
        "simulated {} frames, game time {:.0} ms, phase {:?}, lost races {}",
        frames,
        session.current_time(),
        session.phase(),
        session.lost_races()
    );
    let timing = session.timing_stats();
    info!(
        "fast {} / exact {} / slow {}, mean offset {:.1} ms",
        timing.fast_count,
        timing.exact_count,
        timing.slow_count,
        timing.mean_offset_ms()
    );
    session
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("tunnel-sim starting");

    let notes = load_chart(&args.chart)?;
    info!("loaded {} notes from {}", notes.len(), args.chart.display());

    let config = match &args.config {
        Some(path) => PlayConfig::read(path)?,
        None => PlayConfig::default(),
    };

    let options = SimOptions {
        fps: args.fps,
        poll_interval_ms: args.poll_interval_ms,
        startup_delay_ms: args.startup_delay_ms,
        autoplay: if args.no_autoplay {
            AutoplayMode::Off
        } else {
            AutoplayMode::Full
        },
    };
    let session = simulate(notes, config, &options);
    println!("{}", serde_json::to_string_pretty(&session.score())?);
    Ok(())
}
