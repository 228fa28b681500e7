//! Loading configuration from TOML text or a file

use std::fs;
use std::io;
use std::path::Path;

use log::info;

use super::types::NodeConfig;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parse and validate configuration text
pub fn parse_config(text: &str) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = toml::from_str(text)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&text)?;
    info!("loaded {:?} configuration from {}", config.node.role, path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;

    #[test]
    fn test_minimal_collector() {
        let config = parse_config("[node]\nrole = \"collector\"\n").unwrap();
        assert_eq!(config.node.role, Role::Collector);
        assert_eq!(config.node.http_port, 80);
        assert_eq!(config.schedule.refresh_interval_s, 30);
        assert_eq!(
            config.collector.forecast_url(),
            "https://www.jma.go.jp/bosai/forecast/data/forecast/270000.json"
        );
        assert_eq!(
            config.collector.feed_url(),
            "https://api.thingspeak.com/channels/1441019/feeds/last.json"
        );
    }

    #[test]
    fn test_presenter_url_from_host() {
        let config = parse_config(
            r#"
            [node]
            role = "presenter"

            [presenter]
            collector_host = "shed"
            station_name = "Shed Station"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.presenter.collector_url(),
            "http://shed.local/api/v1/weather.json"
        );
        assert_eq!(config.presenter.settings().document_capacity, 1024);
    }

    #[test]
    fn test_read_api_key_appended() {
        let config = parse_config(
            r#"
            [node]
            role = "collector"

            [collector]
            channel_id = 42
            read_api_key = "SECRET"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.collector.feed_url(),
            "https://api.thingspeak.com/channels/42/feeds/last.json?api_key=SECRET"
        );
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        assert!(matches!(
            parse_config("[node]\nrole = \"collector\"\nbogus = 1\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_config("[node]\nrole = \"toaster\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_config("[node]\nrole = \"collector\"\n[schedule]\nrefresh_interval_s = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        fs::write(&path, "[node]\nrole = \"presenter\"\n[display]\ndevice = \"/tmp/fb\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.display.device, Path::new("/tmp/fb"));

        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
