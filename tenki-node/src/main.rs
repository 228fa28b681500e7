//! Tenki - two-node weather display appliance
//!
//! One binary runs either node, chosen by `[node] role`:
//!
//! - **collector**: fetches the sensor feed and the forecast, republishes
//!   the merged record on `/api/v1/weather.json`
//! - **presenter**: fetches that document and renders it with an animated
//!   weather icon
//!
//! Both run a single cooperative loop fed by timer threads through a
//! mailbox. Fatal conditions, including the daily restart, end the process
//! with an error so the supervisor restarts the node.

#![deny(unsafe_code)]

mod framebuffer;
mod server;
mod tasks;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use tenki_core::clock::SystemClock;
use tenki_core::config::{load_config, parse_config, ConfigError, NodeConfig, Role};
use tenki_core::dispatch::{Dispatcher, LoopControl, Mailbox};
use tenki_core::document::FilterError;
use tenki_core::lookup::CodeLookupTable;
use tenki_core::node::{Collector, NodeRole, Presenter};
use tenki_core::traits::DirAssetStore;
use tenki_display::{DisplayError, Layout, RenderPipeline};
use tenki_protocol::Message;

use crate::framebuffer::FramebufferDevice;
use crate::server::HttpEndpoint;
use crate::transport::HttpClient;

/// Embedded default configuration
/// Edit node.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../node.toml");

/// Pause between main loop iterations
const LOOP_YIELD: Duration = Duration::from_millis(1);

#[derive(Debug, Parser)]
#[command(version, about = "Tenki weather node")]
struct Args {
    /// Configuration file; the embedded node.toml is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Conditions that end the process
#[derive(Debug, thiserror::Error)]
enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot bind port {port}: {reason}")]
    Bind { port: u16, reason: String },
    #[error("display: {0}")]
    Display(#[from] DisplayError),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("filter: {0}")]
    Filter(#[from] FilterError),
    #[error("cannot start timers: {0}")]
    Timer(#[from] std::io::Error),
    #[error("daily restart")]
    Restart,
}

fn main() -> Result<(), NodeError> {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => parse_config(EMBEDDED_CONFIG)?,
    };
    info!("Tenki {:?} node starting", config.node.role);

    let result = match config.node.role {
        Role::Collector => build_collector(&config).and_then(|role| run(role, &config)),
        Role::Presenter => build_presenter(&config).and_then(|role| run(role, &config)),
    };
    if let Err(e) = &result {
        error!("stopping: {}", e);
    }
    result
}

fn http_client(config: &NodeConfig) -> Result<HttpClient, NodeError> {
    let timeout = Duration::from_secs(config.collector.handshake_timeout_s.into());
    Ok(HttpClient::new(timeout)?)
}

fn build_collector(
    config: &NodeConfig,
) -> Result<Collector<HttpClient, DirAssetStore, HttpEndpoint>, NodeError> {
    let assets = DirAssetStore::new(config.assets.root.clone());
    let lookup = CodeLookupTable::new(
        assets,
        config.assets.code_table.clone(),
        config.assets.lookup_capacity,
    );
    let port = config.node.http_port;
    let server = HttpEndpoint::bind(port).map_err(|reason| NodeError::Bind { port, reason })?;
    Ok(Collector::new(
        http_client(config)?,
        lookup,
        server,
        config.collector.settings(),
    )?)
}

fn build_presenter(
    config: &NodeConfig,
) -> Result<Presenter<HttpClient, RenderPipeline<FramebufferDevice, DirAssetStore>>, NodeError> {
    let layout = Layout::default();
    let device = FramebufferDevice::open(&config.display.device, layout.screen)?;
    let pipeline = RenderPipeline::new(
        device,
        DirAssetStore::new(config.assets.root.clone()),
        layout,
        config.presenter.station_name.clone(),
    )?;
    Ok(Presenter::new(
        http_client(config)?,
        pipeline,
        config.presenter.settings(),
    ))
}

/// Main loop: drain the mailbox, service the role, yield
fn run<R: NodeRole>(role: R, config: &NodeConfig) -> Result<(), NodeError> {
    let mailbox = Arc::new(Mailbox::new());
    let _timers = tasks::start(&config.schedule, &mailbox)?;
    let mut dispatcher =
        Dispatcher::new(role, Arc::clone(&mailbox)).with_daily_restart(config.schedule.daily_restart);

    // First cycle right away rather than one interval after boot
    mailbox.post(Message::RefreshRequested);
    info!("{} running", dispatcher.role().name());

    let clock = SystemClock;
    loop {
        if dispatcher.poll(&clock) == LoopControl::Restart {
            let stats = dispatcher.stats();
            info!(
                "{} cycles completed, {} failed",
                stats.completed, stats.failed
            );
            return Err(NodeError::Restart);
        }
        thread::sleep(LOOP_YIELD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = parse_config(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.node.role, Role::Collector);
        assert_eq!(config.presenter.station_name, "Osaka Weather Station");
    }

    #[test]
    fn test_embedded_code_table_covers_clear() {
        let assets = DirAssetStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
        let table = CodeLookupTable::new(assets, "/codes.json", 512);
        let entry = table.lookup("100").unwrap();
        assert_eq!(entry.icon_file, "/100.gif");
        assert_eq!(entry.text_en, "CLEAR");
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["tenki-node", "--config", "/etc/tenki/node.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/tenki/node.toml")));
        assert!(Args::parse_from(["tenki-node"]).config.is_none());
    }
}
