//! evrelay: entry point.
//!
//! Resolves the configuration, sets up the UDP endpoint, opens the input
//! device, and runs exactly one relay loop until the process is told to stop.
//!
//! # Usage
//!
//! ```text
//! evrelay [OPTIONS]
//!
//! Options:
//!   -d, --device <PATH>         Event device file [default: /dev/input/event5]
//!   -i, --ipaddr <ADDR>         IPv4 address of the peer [default: 127.0.0.1]
//!   -j, --job <ROLE>            0/rx/inject or 1/tx/capture [default: 1]
//!   -s, --source-port <PORT>    Local UDP port [default: 5000]
//!   -t, --target-port <PORT>    Peer UDP port [default: 5005]
//!   -c, --config <FILE>         Optional TOML file with any of the above
//!
//! Examples:
//!   evrelay -j 0 -s 5005 -t 5000
//!   evrelay -s 5005 -t 5000 -i 192.168.24.67
//!   evrelay -s 5005 -t 5000 -d /dev/input/event4
//! ```
//!
//! Reading or writing `/dev/input/event*` usually requires root or membership
//! of the `input` group.
//!
//! # Environment variable overrides
//!
//! | Variable              | Option          |
//! |-----------------------|-----------------|
//! | `EVRELAY_DEVICE`      | `--device`      |
//! | `EVRELAY_IPADDR`      | `--ipaddr`      |
//! | `EVRELAY_JOB`         | `--job`         |
//! | `EVRELAY_SOURCE_PORT` | `--source-port` |
//! | `EVRELAY_TARGET_PORT` | `--target-port` |
//! | `EVRELAY_CONFIG`      | `--config`      |
//!
//! Precedence is CLI / environment, then the config file, then defaults.
//!
//! # Exit behaviour
//!
//! A bad address, an unavailable port, or an unopenable device exits non-zero
//! before either loop starts.  Once running, no runtime error stops the
//! process; only Ctrl+C or SIGTERM does.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use evrelay::application::{CaptureLoop, InjectLoop};
use evrelay::domain::{RelayConfig, Role};
use evrelay::infrastructure::{config_file, device::InputDevice, transport::UdpEndpoint};

/// How long to wait for the relay thread after a shutdown signal.  The thread
/// may be parked in a blocking read that only returns on the next event.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relay Linux input events to or from a peer over UDP.
#[derive(Debug, Parser)]
#[command(name = "evrelay", version)]
struct Cli {
    /// Event device file.
    #[arg(short = 'd', long, env = "EVRELAY_DEVICE")]
    device: Option<PathBuf>,

    /// IPv4 address of the peer, dotted decimal.
    #[arg(short = 'i', long, env = "EVRELAY_IPADDR")]
    ipaddr: Option<String>,

    /// Job to perform: 0 (rx/inject) or 1 (tx/capture).
    #[arg(short = 'j', long, env = "EVRELAY_JOB")]
    job: Option<Role>,

    /// Local UDP port.
    #[arg(short = 's', long, env = "EVRELAY_SOURCE_PORT")]
    source_port: Option<u16>,

    /// Peer UDP port.
    #[arg(short = 't', long, env = "EVRELAY_TARGET_PORT")]
    target_port: Option<u16>,

    /// TOML file with default values for any of the options above.
    #[arg(short = 'c', long, env = "EVRELAY_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layers defaults, the optional config file, and the CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let mut config = RelayConfig::default();

        if let Some(path) = &self.config {
            config_file::load(path)
                .with_context(|| format!("invalid config file {}", path.display()))?
                .apply_to(&mut config);
        }

        if let Some(role) = self.job {
            config.role = role;
        }
        if let Some(device) = self.device {
            config.device_path = device;
        }
        if let Some(address) = self.ipaddr {
            config.remote_address = address;
        }
        if let Some(port) = self.source_port {
            config.local_port = port;
        }
        if let Some(port) = self.target_port {
            config.remote_port = port;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;
    log_device_info(&config);

    // ── Fatal setup: nothing runs unless all of this succeeds ────────────────
    let endpoint = UdpEndpoint::setup(
        &config.remote_address,
        config.local_port,
        config.remote_port,
    )
    .context("failed to set up UDP endpoint")?;
    let device = InputDevice::open(&config.device_path).context("failed to open input device")?;

    // ── Relay loop on a blocking thread, signals on the runtime ──────────────
    let running = Arc::new(AtomicBool::new(true));
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    let relay = {
        let running = Arc::clone(&running);
        let role = config.role;
        runtime.spawn_blocking(move || run_role(role, endpoint, device, &running))
    };

    runtime.block_on(async {
        tokio::select! {
            joined = relay => joined.context("relay thread panicked"),
            signal = shutdown_signal() => {
                signal?;
                info!("shutdown signal received");
                running.store(false, Ordering::Relaxed);
                Ok(())
            }
        }
    })?;

    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    info!("evrelay stopped");
    Ok(())
}

/// Runs the loop selected by `role` until `running` is cleared, then closes
/// the socket.
fn run_role(role: Role, endpoint: UdpEndpoint, device: InputDevice, running: &AtomicBool) {
    match role {
        Role::Capture => {
            let mut relay = CaptureLoop::new(device, endpoint);
            relay.run(running);
            let (_device, endpoint) = relay.into_parts();
            endpoint.teardown();
        }
        Role::Inject => {
            let mut relay = InjectLoop::new(endpoint, device);
            relay.run(running);
            let (endpoint, _device) = relay.into_parts();
            endpoint.teardown();
        }
    }
}

fn log_device_info(config: &RelayConfig) {
    info!("role           = {}", config.role);
    info!("local port     = {}", config.local_port);
    info!("remote port    = {}", config.remote_port);
    info!("remote address = {}", config.remote_address);
    info!("device         = {}", config.device_path.display());
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl+C")?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl+C")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
