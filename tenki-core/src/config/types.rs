//! Configuration type definitions
//!
//! Every section except `[node]` may be omitted; omitted keys take the
//! defaults below.

use std::path::PathBuf;

use serde::Deserialize;
use tenki_protocol::ENDPOINT_PATH;

use crate::lookup::{CODE_TABLE_PATH, DEFAULT_LOOKUP_CAPACITY};
use crate::node::{CollectorSettings, PresenterSettings};

/// Which half of the appliance this node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Collector,
    Presenter,
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub node: NodeSection,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// `[node]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSection {
    pub role: Role,
    /// Name announced on the local network
    #[serde(default = "default_host_name")]
    pub host_name: String,
    /// Port the collector serves its document on
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_host_name() -> String {
    "tenki-collector".into()
}

fn default_http_port() -> u16 {
    80
}

/// `[schedule]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Seconds between refresh cycles
    pub refresh_interval_s: u32,
    /// Milliseconds between clock ticks
    pub clock_interval_ms: u32,
    /// Exit at 23:59:59 so the supervisor restarts the node
    pub daily_restart: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_s: 30,
            clock_interval_ms: 500,
            daily_restart: true,
        }
    }
}

/// `[collector]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    /// Forecast area (270000 = Osaka)
    pub area_code: u32,
    /// URL template; `{area_code}` is substituted
    pub forecast_url: String,
    /// Sensor channel id
    pub channel_id: u32,
    /// URL template; `{channel_id}` is substituted
    pub feed_url: String,
    /// Read key for private channels
    pub read_api_key: Option<String>,
    pub forecast_capacity: usize,
    pub feed_capacity: usize,
    /// Connect and TLS handshake timeout
    pub handshake_timeout_s: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            area_code: 270000,
            forecast_url: "https://www.jma.go.jp/bosai/forecast/data/forecast/{area_code}.json".into(),
            channel_id: 1441019,
            feed_url: "https://api.thingspeak.com/channels/{channel_id}/feeds/last.json".into(),
            read_api_key: None,
            forecast_capacity: 6144,
            feed_capacity: 512,
            handshake_timeout_s: 180,
        }
    }
}

impl CollectorConfig {
    pub fn forecast_url(&self) -> String {
        self.forecast_url
            .replace("{area_code}", &self.area_code.to_string())
    }

    pub fn feed_url(&self) -> String {
        let url = self
            .feed_url
            .replace("{channel_id}", &self.channel_id.to_string());
        match &self.read_api_key {
            Some(key) if !key.is_empty() => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{url}{separator}api_key={key}")
            }
            _ => url,
        }
    }

    pub fn settings(&self) -> CollectorSettings {
        CollectorSettings {
            forecast_url: self.forecast_url(),
            feed_url: self.feed_url(),
            forecast_capacity: self.forecast_capacity,
            feed_capacity: self.feed_capacity,
        }
    }
}

/// `[presenter]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresenterConfig {
    /// Full document URL; derived from `collector_host` when absent
    pub collector_url: Option<String>,
    pub collector_host: String,
    pub document_capacity: usize,
    /// First line of the title strip
    pub station_name: String,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            collector_url: None,
            collector_host: default_host_name(),
            document_capacity: 1024,
            station_name: "Osaka Weather Station".into(),
        }
    }
}

impl PresenterConfig {
    pub fn collector_url(&self) -> String {
        match &self.collector_url {
            Some(url) => url.clone(),
            None => format!("http://{}.local{}", self.collector_host, ENDPOINT_PATH),
        }
    }

    pub fn settings(&self) -> PresenterSettings {
        PresenterSettings {
            document_url: self.collector_url(),
            document_capacity: self.document_capacity,
        }
    }
}

/// `[assets]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory holding the code table and icons
    pub root: PathBuf,
    pub code_table: String,
    pub lookup_capacity: usize,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            code_table: CODE_TABLE_PATH.into(),
            lookup_capacity: DEFAULT_LOOKUP_CAPACITY,
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Framebuffer device or file receiving RGB565 frames
    pub device: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb0"),
        }
    }
}

impl NodeConfig {
    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.schedule.refresh_interval_s == 0 {
            errors.push("schedule.refresh_interval_s must be > 0");
        }
        if self.schedule.clock_interval_ms == 0 {
            errors.push("schedule.clock_interval_ms must be > 0");
        }

        match self.node.role {
            Role::Collector => {
                if self.collector.forecast_capacity == 0 || self.collector.feed_capacity == 0 {
                    errors.push("collector capacities must be > 0");
                }
                if !self.collector.forecast_url.contains("{area_code}") {
                    errors.push("collector.forecast_url must contain {area_code}");
                }
                if !self.collector.feed_url.contains("{channel_id}") {
                    errors.push("collector.feed_url must contain {channel_id}");
                }
                if self.assets.lookup_capacity == 0 {
                    errors.push("assets.lookup_capacity must be > 0");
                }
            }
            Role::Presenter => {
                if self.presenter.document_capacity == 0 {
                    errors.push("presenter.document_capacity must be > 0");
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }
}
