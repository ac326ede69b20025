//! Command line interface for the `wallcal` binary

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use wallcal_config::AlignmentConfig;
use wallcal_core::{
    AlignmentEvent, AlignmentSession, AnimationStatus, ApplyMode, CompletionPayload, SceneNode,
    TargetNode,
};
use wallcal_spatial::{Point3D, Transform};

use crate::markers::MarkerFile;

#[derive(Parser, Debug)]
#[command(name = "wallcal")]
#[command(about = "Calibrate a virtual wall model to a physical wall from three markers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./wallcal.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a marker file and print the resulting transform
    Solve {
        /// Marker file (TOML)
        markers: PathBuf,

        /// Print the completion payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Animate the solved transform on a simulated frame clock
    Preview {
        /// Marker file (TOML)
        markers: PathBuf,

        /// Simulated frames per second
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
        fps: u32,
    },
}

/// Install the fmt subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "wallcal=info",
        1 => "wallcal=debug,wallcal_core=debug,wallcal_config=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: Option<&Path>) -> Result<AlignmentConfig> {
    match path {
        Some(path) => AlignmentConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => AlignmentConfig::discover().context("Failed to load discovered config"),
    }
}

/// Result of `wallcal solve`
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    #[serde(flatten)]
    pub payload: CompletionPayload,
    /// Per-marker distance between the mapped model marker and its real marker
    pub residuals: Vec<f64>,
    pub rms_error: f64,
}

/// One simulated frame of `wallcal preview`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePose {
    pub frame: usize,
    pub elapsed_ms: f64,
    pub transform: Transform,
}

/// Solve and apply instantly to a scene node posed as the marker file says
pub fn solve_markers(markers: &MarkerFile, config: &AlignmentConfig) -> Result<SolveReport> {
    let real = markers.real_points();
    let model = markers.model_points();
    let target_world = markers.target_transform();
    let mut wall = SceneNode::new("wall").with_transform(target_world);

    let completed = Rc::new(RefCell::new(None));
    let mut session = AlignmentSession::new(config)?;
    {
        let completed = Rc::clone(&completed);
        session.subscribe(move |event| {
            if let AlignmentEvent::Completed(payload) = event {
                *completed.borrow_mut() = Some(*payload);
            }
        });
    }

    let transform = session.align_with_mode(&mut wall, &real, &model, ApplyMode::Instant)?;
    let payload = completed
        .borrow_mut()
        .take()
        .context("Alignment finished without a completion event")?;

    let model_local: Vec<Point3D> = model
        .iter()
        .map(|p| target_world.inverse_transform_point(*p))
        .collect();
    let residuals = transform.residuals(&model_local, &real);
    let rms_error = transform.rms_error(&model_local, &real);

    Ok(SolveReport {
        payload,
        residuals,
        rms_error,
    })
}

/// Run the animated application frame by frame at `fps`
pub fn preview_frames(
    markers: &MarkerFile,
    config: &AlignmentConfig,
    fps: u32,
) -> Result<Vec<FramePose>> {
    anyhow::ensure!(fps > 0, "fps must be positive");

    let real = markers.real_points();
    let model = markers.model_points();
    let mut wall = SceneNode::new("wall").with_transform(markers.target_transform());

    let mode = ApplyMode::Animated {
        duration: config.animation.duration(),
        easing: config.animation.easing,
    };
    let mut session = AlignmentSession::new(config)?;
    session.align_with_mode(&mut wall, &real, &model, mode)?;

    let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps));
    let start = Instant::now();
    let mut frames = Vec::new();
    let mut frame = 0usize;

    loop {
        let elapsed = frame_elapsed(frame_time, frame)?;
        let status = session.advance(&mut wall, start + elapsed);
        frames.push(FramePose {
            frame,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            transform: wall.local_transform(),
        });

        match status {
            AnimationStatus::Running { .. } => frame += 1,
            AnimationStatus::Completed => break,
            AnimationStatus::Cancelled | AnimationStatus::Inactive => {
                anyhow::bail!("Preview animation stopped at frame {}", frame)
            }
        }
    }

    Ok(frames)
}

/// Time of frame `frame` on a clock ticking every `frame_time`
fn frame_elapsed(frame_time: Duration, frame: usize) -> Result<Duration> {
    u32::try_from(frame)
        .ok()
        .and_then(|n| frame_time.checked_mul(n))
        .with_context(|| format!("Frame {} is past the end of the preview clock", frame))
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Solve { markers, json } => {
            let markers = MarkerFile::load(&markers)?;
            let report = solve_markers(&markers, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Preview { markers, fps } => {
            let markers = MarkerFile::load(&markers)?;
            let frames = preview_frames(&markers, &config, fps)?;
            for pose in &frames {
                let t = &pose.transform;
                println!(
                    "{:>4} {:>8.1}ms  pos ({:.4}, {:.4}, {:.4})  rot ({:.4}, {:.4}, {:.4}, {:.4})  scale {:.4}",
                    pose.frame,
                    pose.elapsed_ms,
                    t.position.x,
                    t.position.y,
                    t.position.z,
                    t.rotation.x,
                    t.rotation.y,
                    t.rotation.z,
                    t.rotation.w,
                    t.scale.x
                );
            }
        }
    }

    Ok(())
}

fn print_report(report: &SolveReport) {
    let p = &report.payload;
    println!(
        "position  ({:.6}, {:.6}, {:.6})",
        p.position.x, p.position.y, p.position.z
    );
    println!(
        "rotation  ({:.6}, {:.6}, {:.6}, {:.6})",
        p.rotation.x, p.rotation.y, p.rotation.z, p.rotation.w
    );
    println!("scale     {:.6}", p.scale);
    println!("rms error {:.3e}", report.rms_error);
}
