// monet -- operator console for the microMONET telescope mount, against
// real hardware or the simulated firmware.
//
// Usage:
//   monet --port /dev/ttyACM0 position
//   monet --port /dev/ttyACM0 slew 45 90 --tolerance 0.1
//   monet --port /dev/ttyACM0 speed 7
//   monet --port /dev/ttyACM0 led on
//   monet --port /dev/ttyACM0 raw GET_TEMP
//   monet --simulate menu
//
// Set RUST_LOG=micromonet=debug (or pass -vv) to see every exchange.

mod menu;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use micromonet::{MicroMonet, MicroMonetBuilder};
use monet_core::{Position, format_decimal};
use monet_core::types::DEFAULT_SLEW_TOLERANCE_DEG;
use monet_test_harness::SimulatedMount;
use monet_transport::DEFAULT_BAUD_RATE;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// monet -- drive a microMONET mount from the command line.
#[derive(Parser)]
#[command(name = "monet", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, /dev/cu.usbmodem142101, COM3).
    /// Required unless --simulate is used.
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Deadline for one command/response exchange, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Give up waiting for the ready banner after this many milliseconds.
    /// Without it the wait is unbounded.
    #[arg(long)]
    ready_timeout_ms: Option<u64>,

    /// Talk to a simulated mount instead of a real serial port.
    #[arg(long)]
    simulate: bool,

    /// Skip waiting for the ready banner (the mount is already running).
    #[arg(long)]
    no_wait: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current mount position.
    Position,

    /// Slew to a target and poll until it is reached.
    /// Ctrl-C (or --max-wait-s expiring) aborts the slew.
    Slew {
        /// Target altitude in degrees.
        #[arg(allow_negative_numbers = true)]
        altitude: f64,
        /// Target azimuth in degrees.
        #[arg(allow_negative_numbers = true)]
        azimuth: f64,

        /// Arrival tolerance on each axis, in degrees.
        #[arg(long, default_value_t = DEFAULT_SLEW_TOLERANCE_DEG)]
        tolerance: f64,

        /// Interval between position polls, in milliseconds.
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,

        /// Abort the slew if it has not arrived after this many seconds.
        #[arg(long)]
        max_wait_s: Option<u64>,
    },

    /// Set the motor speed (1-15 RPM).
    Speed {
        /// Speed in RPM.
        rpm: u8,
    },

    /// Switch the status LED.
    Led {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Switch the imaging-sensor illumination.
    Ccd {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Read the temperature sensor.
    Temp,

    /// Read the humidity sensor.
    Humidity,

    /// Abort an in-progress slew.
    Abort,

    /// Send one raw command line and print the response.
    Raw {
        /// Command words, joined with single spaces (e.g. `raw SET_SPEED 5`).
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Interactive numbered menu.
    Menu,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reject flag combinations that cannot work before touching the port.
fn validate_options(cli: &Cli) -> Result<()> {
    if cli.simulate && cli.port.is_some() {
        bail!("--port and --simulate are mutually exclusive");
    }
    if !cli.simulate && cli.port.is_none() {
        bail!("--port is required unless --simulate is used");
    }
    if cli.timeout_ms == 0 {
        bail!("--timeout-ms must be greater than zero");
    }
    if let Command::Slew {
        tolerance, poll_ms, ..
    } = &cli.command
    {
        if !(tolerance.is_finite() && *tolerance > 0.0) {
            bail!("--tolerance must be a positive number of degrees");
        }
        if *poll_ms == 0 {
            bail!("--poll-ms must be greater than zero");
        }
    }
    Ok(())
}

async fn connect(cli: &Cli) -> Result<MicroMonet> {
    tracing::debug!(
        port = ?cli.port,
        simulate = cli.simulate,
        baud = cli.baud,
        timeout_ms = cli.timeout_ms,
        "connecting to mount"
    );
    let builder = MicroMonetBuilder::new()
        .baud_rate(cli.baud)
        .command_timeout(Duration::from_millis(cli.timeout_ms))
        .ready_timeout(cli.ready_timeout_ms.map(Duration::from_millis));

    if cli.simulate {
        return builder
            .build_with_transport(Box::new(SimulatedMount::new()))
            .await
            .context("failed to build MicroMonet with simulated mount");
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required when not using --simulate")?;
    builder
        .serial_port(port)
        .build()
        .await
        .with_context(|| format!("failed to open serial port {port} at {} baud", cli.baud))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// How a tracked slew ended.
#[derive(Debug, PartialEq)]
enum SlewOutcome {
    Arrived(Position),
    Interrupted,
}

/// Command the slew, then poll until the mount is within `tolerance` of
/// `target`. Past `max_wait` the slew is aborted and reported as an error.
async fn poll_until_arrived(
    mount: &MicroMonet,
    target: Position,
    tolerance: f64,
    poll: Duration,
    max_wait: Option<Duration>,
) -> Result<Position> {
    mount
        .set_position(target.altitude, target.azimuth)
        .await
        .context("failed to start slew")?;
    println!("Slewing to {target} (Ctrl-C to abort)...");

    let deadline = max_wait.map(|max| Instant::now() + max);
    loop {
        let here = mount.get_position().await?;
        println!("Current Position - {here}");
        if here.within(&target, tolerance) {
            return Ok(here);
        }

        if let Some(dl) = deadline {
            if Instant::now() >= dl {
                mount.abort_slew().await?;
                bail!("slew did not reach {target} in time; aborted at {here}");
            }
        }

        tokio::time::sleep(poll).await;
    }
}

/// Track a slew until it arrives or `interrupt` resolves, in which case
/// `ABORT` is sent.
///
/// `interrupt` is polled before the slew command goes out, so a Ctrl-C
/// listener passed here is installed before the mount starts moving.
async fn track_slew(
    mount: &MicroMonet,
    target: Position,
    tolerance: f64,
    poll: Duration,
    max_wait: Option<Duration>,
    interrupt: impl std::future::Future<Output = io::Result<()>>,
) -> Result<SlewOutcome> {
    tokio::select! {
        biased;
        signal = interrupt => {
            signal.context("failed to listen for Ctrl-C")?;
            mount.abort_slew().await.context("failed to abort slew")?;
            Ok(SlewOutcome::Interrupted)
        }
        arrived = poll_until_arrived(mount, target, tolerance, poll, max_wait) => {
            arrived.map(SlewOutcome::Arrived)
        }
    }
}

async fn cmd_slew(
    mount: &MicroMonet,
    target: Position,
    tolerance: f64,
    poll: Duration,
    max_wait: Option<Duration>,
) -> Result<()> {
    let outcome = track_slew(
        mount,
        target,
        tolerance,
        poll,
        max_wait,
        tokio::signal::ctrl_c(),
    )
    .await?;
    match outcome {
        SlewOutcome::Arrived(_) => println!("Slew completed successfully!"),
        SlewOutcome::Interrupted => println!("Slew aborted!"),
    }
    Ok(())
}

async fn run_command(mount: &MicroMonet, command: &Command) -> Result<()> {
    match command {
        Command::Position => {
            let here = mount.get_position().await?;
            println!("Current Position - {here}");
        }
        Command::Slew {
            altitude,
            azimuth,
            tolerance,
            poll_ms,
            max_wait_s,
        } => {
            cmd_slew(
                mount,
                Position::new(*altitude, *azimuth),
                *tolerance,
                Duration::from_millis(*poll_ms),
                max_wait_s.map(Duration::from_secs),
            )
            .await?;
        }
        Command::Speed { rpm } => {
            mount.set_speed(*rpm).await?;
            println!("Speed set to {rpm} RPM.");
        }
        Command::Led { state } => match state {
            Switch::On => {
                mount.led_on().await?;
                println!("LED turned on.");
            }
            Switch::Off => {
                mount.led_off().await?;
                println!("LED turned off.");
            }
        },
        Command::Ccd { state } => match state {
            Switch::On => {
                mount.ccd_on().await?;
                println!("CCD turned on.");
            }
            Switch::Off => {
                mount.ccd_off().await?;
                println!("CCD turned off.");
            }
        },
        Command::Temp => {
            let celsius = mount.get_temperature().await?;
            println!("Temperature: {} °C", format_decimal(celsius));
        }
        Command::Humidity => {
            let percent = mount.get_humidity().await?;
            println!("Humidity: {} %", format_decimal(percent));
        }
        Command::Abort => {
            mount.abort_slew().await?;
            println!("Slew aborted!");
        }
        Command::Raw { command } => {
            let line = command.join(" ");
            let response = mount.send_command(&line).await?;
            println!("{response}");
        }
        Command::Menu => {
            let mut input = io::BufReader::new(io::stdin());
            let mut output = io::stdout();
            menu::run_menu(mount, &mut input, &mut output).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    validate_options(&cli)?;

    let mount = connect(&cli).await?;

    if !cli.no_wait {
        println!("Waiting for mount to initialize...");
        if let Err(e) = mount.wait_for_ready().await {
            mount.close().await.ok();
            return Err(e).context("mount did not report ready");
        }
        println!("Mount ready.");
    }

    let result = run_command(&mount, &cli.command).await;
    mount.close().await.ok();
    result
}
