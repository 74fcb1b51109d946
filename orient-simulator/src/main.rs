use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use motion::{builtin_tour, read_motion_script};
use orient_common::orientation::{
    DEFAULT_SAMPLING_INTERVAL_MS, DEFAULT_STABLE_SAMPLE_COUNT, DEFAULT_THRESHOLD_X,
    DEFAULT_THRESHOLD_Y, DEFAULT_THRESHOLD_Z,
};
use orient_common::{ClassificationConfig, HostEvent};
use simulation::run_simulation;

mod motion;
mod simulation;
mod virt_drivers;

#[derive(Parser)]
#[command(name = "Orient Simulator")]
#[command(bin_name = "orient-simulator")]
#[command(about = "Run the device and the host against a scripted virtual sensor")]
struct Cli {
    /// CSV with `duration_ms,x,y,z` rows, a tour of every orientation if absent
    #[arg(long, short)]
    script: Option<PathBuf>,
    /// Uniform noise added to every axis, in g
    #[arg(long, default_value_t = 0.0)]
    noise: f32,
    #[arg(long, default_value_t = DEFAULT_SAMPLING_INTERVAL_MS)]
    sampling_interval_ms: u32,
    #[arg(long, default_value_t = DEFAULT_STABLE_SAMPLE_COUNT)]
    stable_sample_count: u32,
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_X)]
    threshold_x: f32,
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_Y)]
    threshold_y: f32,
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_Z)]
    threshold_z: f32,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::builder().filter_level(level).try_init();

    let steps = match &args.script {
        Some(path) => read_motion_script(path)?,
        None => builtin_tour(),
    };
    let config = ClassificationConfig::new(
        args.sampling_interval_ms,
        args.stable_sample_count,
        args.threshold_x,
        args.threshold_y,
        args.threshold_z,
    );

    let report = run_simulation(&steps, config, args.noise, |event| match event {
        HostEvent::Orientation(orientation) => println!("{}", orientation),
        event => log::info!("{:?}", event),
    })
    .await?;

    if report.watchdog_expirations > 0 {
        log::warn!(
            "The watchdog would have reset the device {} times",
            report.watchdog_expirations
        );
    }
    Ok(())
}
