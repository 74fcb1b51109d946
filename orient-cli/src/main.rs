use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use create_serial::{create_serial, is_likely_device, likely_device_ports, Serial};
use embedded_hal_async::delay::DelayNs;
use host_config::{default_config_path, read_host_config, HostConfig};
use log::LevelFilter;
use orient_common::driver::clock::Clock;
use orient_common::orientation::{
    DEFAULT_SAMPLING_INTERVAL_MS, DEFAULT_STABLE_SAMPLE_COUNT, DEFAULT_THRESHOLD_X,
    DEFAULT_THRESHOLD_Y, DEFAULT_THRESHOLD_Z,
};
use orient_common::{ClassificationConfig, HostEvent, HostLink};
use screen_action::{display_args, run_display_program};
use tokio::time::{sleep, timeout};
use tokio_serial::available_ports;

mod create_serial;
mod host_config;
mod screen_action;

// The device announces itself every 300ms, a few missed lines are fine
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

struct Delay;

impl DelayNs for Delay {
    async fn delay_ns(&mut self, ns: u32) {
        sleep(Duration::from_nanos(ns as u64)).await;
    }
}

#[derive(Clone)]
struct TokioClock {
    start: Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

type Link = HostLink<Serial, Delay, TokioClock>;

#[derive(Parser)]
#[command(name = "Orient CLI")]
#[command(bin_name = "orient-cli")]
struct Cli {
    /// Repeat for more detailed logs
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List serial ports, marking the ones that look like a sensor")]
    Detect,
    Watch(WatchArgs),
    Run(RunArgs),
}

#[derive(clap::Args)]
#[command(about = "Print the orientations reported by a sensor")]
struct WatchArgs {
    /// Defaults to the first port that looks like a sensor
    serial: Option<String>,
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
}

#[derive(clap::Args)]
#[command(about = "Rotate the screen to follow the sensor")]
struct RunArgs {
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Overrides the mode selected in the config file
    #[arg(long, short)]
    mode: Option<String>,
    /// Log the display commands instead of running them
    #[clap(long, action)]
    dry_run: bool,
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

    match args.command {
        Commands::Detect => detect(),
        Commands::Watch(args) => watch(args).await,
        Commands::Run(args) => run(args).await,
    }
}

fn detect() -> Result<()> {
    for port in available_ports()? {
        let marker = if is_likely_device(&port) { " (sensor?)" } else { "" };
        println!("{}{} {:?}", port.port_name, marker, port.port_type);
    }
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let config = ClassificationConfig::new(
        args.sampling_interval_ms,
        args.stable_sample_count,
        args.threshold_x,
        args.threshold_y,
        args.threshold_z,
    );
    let port = match args.serial {
        Some(port) => port,
        None => likely_device_ports()?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No sensor found, pass the serial port explicitly"))?,
    };

    let mut link = HostLink::new(create_serial(&port)?, Delay, TokioClock::new(), config);
    log::info!("Waiting for the sensor on {}", port);
    link.connect()
        .await
        .map_err(|e| anyhow!("handshake failed: {:?}", e))?;

    loop {
        match link.next_event().await {
            Ok(HostEvent::Orientation(orientation)) => println!("{}", orientation),
            Ok(event) => log::info!("{:?}", event),
            Err(e) => bail!("lost the sensor: {:?}", e),
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mode_override = args.mode.as_deref();
    let mut config = read_host_config(&path, mode_override)?;
    log::info!("Using mode {} from {}", config.mode_name, path.display());

    loop {
        let mut link = connect(&config).await?;
        follow(&mut link, &mut config, &path, mode_override, args.dry_run).await;

        sleep(RETRY_INTERVAL).await;
        // edits to the config file take effect after replugging the sensor
        match read_host_config(&path, mode_override) {
            Ok(new_config) => config = new_config,
            Err(e) => log::warn!("Keeping the previous config: {:#}", e),
        }
    }
}

/// Returns once the link fails.
async fn follow(
    link: &mut Link,
    config: &mut HostConfig,
    path: &Path,
    mode_override: Option<&str>,
    dry_run: bool,
) {
    loop {
        let event = match link.next_event().await {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Lost the sensor: {:?}", e);
                return;
            }
        };

        match event {
            HostEvent::Orientation(orientation) => {
                log::info!("Orientation: {}", orientation);
                let Some(action) = config.mode.screens.action_for(orientation) else {
                    continue;
                };
                let Some(display_args) = display_args(config.mode.monitor, action) else {
                    continue;
                };
                if dry_run {
                    log::info!("{} {}", config.display_program, display_args.join(" "));
                } else if let Err(e) =
                    run_display_program(&config.display_program, &display_args).await
                {
                    log::warn!("Failed to change the display: {:#}", e);
                }
            }
            HostEvent::DeviceReset => {
                // picked up by the handshake that follows
                match read_host_config(path, mode_override) {
                    Ok(new_config) => {
                        link.set_config(new_config.mode.classification_config());
                        *config = new_config;
                    }
                    Err(e) => log::warn!("Keeping the previous config: {:#}", e),
                }
            }
            HostEvent::Reconnected => log::info!("Sensor reconnected"),
        }
    }
}

/// Tries the configured port, or every likely port, until one completes the
/// handshake.
async fn connect(config: &HostConfig) -> Result<Link> {
    loop {
        let ports = match &config.mode.serial_port {
            Some(port) => vec![port.clone()],
            None => likely_device_ports()?,
        };
        if ports.is_empty() {
            log::warn!("No sensor found");
        }

        for port in ports {
            log::info!("Attempting serial connection to {}", port);
            let serial = match create_serial(&port) {
                Ok(serial) => serial,
                Err(e) => {
                    log::warn!("Connection failed on {}: {}", port, e);
                    continue;
                }
            };
            let mut link = HostLink::new(
                serial,
                Delay,
                TokioClock::new(),
                config.mode.classification_config(),
            );
            match timeout(HANDSHAKE_TIMEOUT, link.connect()).await {
                Ok(Ok(())) => {
                    log::info!("Sensor found on {}", port);
                    return Ok(link);
                }
                Ok(Err(e)) => log::warn!("Handshake failed on {}: {:?}", port, e),
                Err(_) => log::warn!("No ready message on {}, trying the next port", port),
            }
        }

        sleep(RETRY_INTERVAL).await;
    }
}
