//! WLED light platform inspector
//!
//! Loads a controller configuration and a recorded snapshot, sets up the
//! light, number and button platforms against a dry-run client and prints
//! entity states or the controller calls a command would issue.

mod dry_run;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wled_config::WledConfig;
use wled_coordinator::Coordinator;
use wled_core::DeviceSnapshot;
use wled_light::{
    diagnostics, setup_lights, setup_numbers, LightEntity, PlatformHandle, RestartButton,
    SegmentNumber, TurnOffParams, TurnOnParams,
};

use crate::dry_run::DryRunClient;

#[derive(Debug, Parser)]
#[command(name = "wled-light", version, about = "Inspect WLED light entities")]
struct Cli {
    /// Controller configuration (YAML with a `wled:` section)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Recorded device snapshot (JSON)
    #[arg(long, short)]
    snapshot: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the state of every entity
    States,
    /// Turn a light on and print the calls issued
    TurnOn {
        /// Unique id of the light
        entity: String,
        #[arg(long)]
        brightness: Option<u8>,
        #[arg(long, value_delimiter = ',')]
        rgb: Option<Vec<u8>>,
        #[arg(long, value_delimiter = ',')]
        rgbw: Option<Vec<u8>>,
        /// Color temperature in mireds
        #[arg(long)]
        color_temp: Option<u16>,
        /// Color temperature in Kelvin, sent to the CCT channel
        #[arg(long)]
        kelvin: Option<u16>,
        /// Transition in seconds
        #[arg(long)]
        transition: Option<f64>,
        #[arg(long)]
        effect: Option<String>,
    },
    /// Turn a light off and print the calls issued
    TurnOff {
        entity: String,
        #[arg(long)]
        transition: Option<f64>,
    },
    /// Set a speed or intensity number
    SetNumber { entity: String, value: f64 },
    /// Press the restart button
    Restart,
    /// Print diagnostics with wifi details redacted
    Diagnostics,
}

/// Filter used when `RUST_LOG` is not set
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8) {
    let filter = default_filter(verbosity);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entities of all platforms for one controller
struct Platforms {
    coordinator: Arc<Coordinator>,
    client: Arc<DryRunClient>,
    lights: Arc<Mutex<Vec<LightEntity>>>,
    numbers: Arc<Mutex<Vec<Arc<SegmentNumber>>>>,
    button: RestartButton,
    handles: Vec<PlatformHandle>,
}

impl Platforms {
    fn setup(config: WledConfig, snapshot: DeviceSnapshot) -> Result<Self> {
        let client = Arc::new(DryRunClient::new());
        let coordinator = Arc::new(Coordinator::new(client.clone(), config, snapshot));

        let lights = Arc::new(Mutex::new(Vec::new()));
        let sink = lights.clone();
        let light_handle = setup_lights(coordinator.clone(), move |entities: Vec<LightEntity>| {
            if let Ok(mut lights) = sink.lock() {
                lights.extend(entities);
            }
        })?;

        let numbers = Arc::new(Mutex::new(Vec::new()));
        let sink = numbers.clone();
        let number_handle =
            setup_numbers(coordinator.clone(), move |entities: Vec<Arc<SegmentNumber>>| {
                if let Ok(mut numbers) = sink.lock() {
                    numbers.extend(entities);
                }
            })?;

        let button = RestartButton::new(coordinator.clone())?;

        Ok(Self {
            coordinator,
            client,
            lights,
            numbers,
            button,
            handles: vec![light_handle, number_handle],
        })
    }

    /// Stop the platform listeners
    async fn unload(self) {
        for handle in self.handles {
            debug!(platform = handle.platform(), "Unloading platform");
            handle.shutdown().await;
        }
    }

    fn light(&self, unique_id: &str) -> Result<LightEntity> {
        let lights = self.lights.lock().map_err(|_| anyhow!("light registry poisoned"))?;
        lights
            .iter()
            .find(|light| light.unique_id() == unique_id)
            .cloned()
            .ok_or_else(|| anyhow!("no light with unique id '{}'", unique_id))
    }

    fn number(&self, unique_id: &str) -> Result<Arc<SegmentNumber>> {
        let numbers = self.numbers.lock().map_err(|_| anyhow!("number registry poisoned"))?;
        numbers
            .iter()
            .find(|number| number.unique_id() == unique_id)
            .cloned()
            .ok_or_else(|| anyhow!("no number with unique id '{}'", unique_id))
    }

    fn states(&self) -> Result<Value> {
        let lights = self.lights.lock().map_err(|_| anyhow!("light registry poisoned"))?;
        let numbers = self.numbers.lock().map_err(|_| anyhow!("number registry poisoned"))?;

        let mut states: Vec<Value> = Vec::new();
        for light in lights.iter() {
            states.push(serde_json::to_value(light.state())?);
        }
        for number in numbers.iter() {
            states.push(serde_json::to_value(number.state())?);
        }
        states.push(serde_json::to_value(self.button.state())?);
        Ok(Value::Array(states))
    }

    fn calls(&self) -> Value {
        Value::Array(self.client.calls())
    }
}

fn rgb_array<const N: usize>(values: Option<Vec<u8>>, flag: &str) -> Result<Option<[u8; N]>> {
    match values {
        None => Ok(None),
        Some(values) => match <[u8; N]>::try_from(values) {
            Ok(array) => Ok(Some(array)),
            Err(values) => bail!("--{} expects {} values, got {}", flag, N, values.len()),
        },
    }
}

fn load(cli: &Cli) -> Result<(WledConfig, DeviceSnapshot)> {
    let config = match &cli.config {
        Some(path) => WledConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => WledConfig::default(),
    };

    let content = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let snapshot: DeviceSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("parsing snapshot {}", cli.snapshot.display()))?;

    debug!(
        segments = snapshot.segment_count(),
        keep_main_light = config.keep_main_light,
        "Loaded controller"
    );
    Ok((config, snapshot))
}

async fn run(cli: Cli) -> Result<Value> {
    let (config, snapshot) = load(&cli)?;
    let platforms = Platforms::setup(config, snapshot)?;

    let output = match cli.command {
        Command::States => platforms.states()?,
        Command::TurnOn {
            entity,
            brightness,
            rgb,
            rgbw,
            color_temp,
            kelvin,
            transition,
            effect,
        } => {
            let params = TurnOnParams {
                brightness,
                rgb_color: rgb_array(rgb, "rgb")?,
                rgbw_color: rgb_array(rgbw, "rgbw")?,
                color_temp,
                color_temp_kelvin: kelvin,
                transition,
                effect,
            };
            platforms.light(&entity)?.turn_on(params).await?;
            platforms.calls()
        }
        Command::TurnOff { entity, transition } => {
            platforms
                .light(&entity)?
                .turn_off(TurnOffParams { transition })
                .await?;
            platforms.calls()
        }
        Command::SetNumber { entity, value } => {
            platforms.number(&entity)?.set_native_value(value).await?;
            platforms.calls()
        }
        Command::Restart => {
            platforms.button.press().await?;
            platforms.calls()
        }
        Command::Diagnostics => diagnostics(&platforms.coordinator),
    };
    platforms.unload().await;
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!(command = ?cli.command, "Starting");
    let output = run(cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
