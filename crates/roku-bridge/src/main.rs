//! roku-bridge: entry point.
//!
//! Listens for HTTP requests such as `POST /roku/searchroku` (body: the text
//! to search for) and plays the matching routine on a Roku player as a timed
//! series of ECP commands.  The player is found automatically with SSDP; no
//! IP address needs to be configured.
//!
//! # Usage
//!
//! ```text
//! roku-bridge [OPTIONS]
//!
//! Options:
//!   --config        <PATH>  Config file [default: roku-bridge.toml]
//!   --port          <PORT>  HTTP listener port [default: 8080]
//!   --bind          <IP>    HTTP listener address [default: 0.0.0.0]
//!   --address       <URL>   Device base URL; skips the first search
//!   --search-target <ST>    SSDP search target [default: roku:ecp]
//!   --print-config          Print the effective config as TOML and exit
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file.
//!
//! | Variable                    | Overrides                    |
//! |-----------------------------|------------------------------|
//! | `ROKU_BRIDGE_CONFIG`        | `--config`                   |
//! | `ROKU_BRIDGE_PORT`          | `[server] port`              |
//! | `ROKU_BRIDGE_BIND`          | `[server] bind_address`      |
//! | `ROKU_ADDRESS`              | `[discovery] address`        |
//! | `ROKU_SEARCH_TARGET`        | `[discovery] search_target`  |
//! | `RUST_LOG`                  | `[logging] level`            |

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use roku_core::DeviceLocation;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use roku_bridge::application::{CommandSequencer, DiscoveryAgent};
use roku_bridge::infrastructure::http_server::{run_server, AppState};
use roku_bridge::infrastructure::network::ecp::HttpActionExecutor;
use roku_bridge::infrastructure::network::ssdp::{start_discovery, UdpDiscoveryTransport};
use roku_bridge::infrastructure::storage::config::{load_config, BridgeConfig, DEFAULT_CONFIG_FILE};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// HTTP-to-ECP bridge for Roku players.
#[derive(Debug, Parser)]
#[command(
    name = "roku-bridge",
    about = "Turns HTTP requests into timed Roku remote-control sequences",
    version
)]
struct Cli {
    /// Path to the TOML config file.  A missing file means all defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "ROKU_BRIDGE_CONFIG")]
    config: PathBuf,

    /// TCP port for the HTTP listener.
    #[arg(long, env = "ROKU_BRIDGE_PORT")]
    port: Option<u16>,

    /// IP address to bind the HTTP listener to.
    #[arg(long, env = "ROKU_BRIDGE_BIND")]
    bind: Option<String>,

    /// Device base URL, e.g. `http://192.168.1.20:8060/`.
    ///
    /// Discovery stays quiet while this is set; a later discovery response
    /// still replaces it.
    #[arg(long, env = "ROKU_ADDRESS")]
    address: Option<String>,

    /// SSDP `ST` header sent in search queries.
    #[arg(long, env = "ROKU_SEARCH_TARGET")]
    search_target: Option<String>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Overlays the flags that were given onto `config`.
    fn apply_to(&self, config: &mut BridgeConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(address) = &self.address {
            config.discovery.address = Some(address.clone());
        }
        if let Some(st) = &self.search_target {
            config.discovery.search_target = st.clone();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    cli.apply_to(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let listen_addr = config.server.listen_addr()?;
    info!(
        "roku bridge starting: http={listen_addr}, st={}",
        config.discovery.search_target
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Device location ───────────────────────────────────────────────────────
    let location = DeviceLocation::new();
    if let Some(address) = &config.discovery.address {
        location.set(address.clone());
        info!("using configured device address {address}");
    }

    // ── Sequencer ─────────────────────────────────────────────────────────────
    let executor = HttpActionExecutor::new(config.ecp.request_timeout())
        .context("failed to build ECP HTTP client")?;
    let sequencer = CommandSequencer::new(Arc::new(executor), location.clone());

    let (routines, rejected) = config.routine_table();
    for e in &rejected {
        error!("skipping custom routine: {e}");
    }
    info!("{} routines available", routines.len());
    debug!("routes: {}", routines.names().join(", "));

    // ── Discovery ─────────────────────────────────────────────────────────────
    let any_port = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    let transport = UdpDiscoveryTransport::bind(any_port, &config.discovery.multicast_addr)
        .await
        .context("failed to start SSDP discovery")?;
    let socket = transport.socket();
    let agent = Arc::new(DiscoveryAgent::new(
        Arc::new(transport),
        location,
        config.discovery.search_target.clone(),
    ));
    let discovery = start_discovery(
        agent,
        socket,
        config.discovery.interval(),
        Arc::clone(&running),
    );

    // ── HTTP server ───────────────────────────────────────────────────────────
    let served = run_server(listen_addr, AppState::new(sequencer, routines), Arc::clone(&running)).await;

    running.store(false, Ordering::Relaxed);
    for (name, task) in [("ticker", discovery.ticker), ("listener", discovery.listener)] {
        if let Err(e) = task.await {
            warn!("discovery {name} task ended abnormally: {e}");
        }
    }

    served?;
    info!("roku bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
