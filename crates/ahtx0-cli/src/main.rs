//! AHTx0 Sensor Tool
//!
//! Reads the AHTx0 sensor through the native library, or straight from the
//! I2C bus for troubleshooting.

use ahtx0_client::{loader, Ahtx0, SensorConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ahtx0ctl")]
#[command(about = "Read the AHTx0 temperature/humidity sensor")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML sensor configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read through the native library
    Read {
        /// Number of readings to take
        #[arg(long, default_value = "1")]
        count: u32,

        /// Delay between readings in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },
    /// Show the native library version and location
    Version,
    /// Read straight from the I2C bus, bypassing the native library
    Direct {
        /// I2C bus device
        #[arg(long, default_value = read_ahtx0_rs::I2C_BUS_PATH)]
        bus: String,

        /// 7-bit device address (decimal or 0x-prefixed hex)
        #[arg(long, default_value = "0x38", value_parser = parse_address)]
        address: u8,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => SensorConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => SensorConfig::default(),
    };
    debug!("Using configuration: {:?}", config);

    match cli.command {
        Commands::Read { count, interval_ms } => handle_read(&config, count, interval_ms),
        Commands::Version => handle_version(),
        Commands::Direct { bus, address } => handle_direct(&bus, address),
        Commands::Config => handle_config(&config),
    }
}

fn handle_read(config: &SensorConfig, count: u32, interval_ms: u64) -> Result<()> {
    let sensor = Ahtx0::with_config(config);
    if !sensor.is_available() {
        anyhow::bail!("Native library is not loaded. Run `ahtx0ctl version` for details.");
    }

    for i in 0..count {
        if i > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }

        let sample = sensor.current_sample();
        println!(
            "Temperature: {}",
            format_value(&sensor, sample.temperature, "°C")
        );
        println!(
            "Humidity:    {}",
            format_value(&sensor, sample.humidity, "%RH")
        );
    }

    Ok(())
}

fn format_value(sensor: &Ahtx0, value: f64, unit: &str) -> String {
    if sensor.is_invalid(value) {
        "invalid".to_string()
    } else {
        format!("{:.2} {}", value, unit)
    }
}

fn handle_version() -> Result<()> {
    let library = loader::require_library().context("Native library is not available")?;

    println!("Library version: {}", library.version());
    println!("Loaded from:     {}", library.origin());
    Ok(())
}

#[cfg(target_os = "linux")]
fn handle_direct(bus: &str, address: u8) -> Result<()> {
    use linux_embedded_hal::{Delay, I2cdev};
    use read_ahtx0_rs::Ahtx0 as Driver;

    let i2c = I2cdev::new(bus).with_context(|| format!("Failed to open I2C bus {}", bus))?;
    let mut sensor =
        Driver::new(i2c, Delay, address).context("Failed to initialize AHTx0 sensor")?;
    let measurement = sensor.measure().context("Failed to read sensor")?;

    println!("Temperature: {:.2} °C", measurement.temperature);
    println!("Humidity:    {:.2} %RH", measurement.humidity);
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn handle_direct(_bus: &str, _address: u8) -> Result<()> {
    anyhow::bail!("Direct I2C access is only supported on Linux")
}

fn handle_config(config: &SensorConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn parse_address(s: &str) -> std::result::Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    match parsed {
        Ok(address) if address <= 0x7F => Ok(address),
        Ok(address) => Err(format!("Address {:#04x} is outside the 7-bit range", address)),
        Err(e) => Err(format!("Invalid address '{}': {}", s, e)),
    }
}
