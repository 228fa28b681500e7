//! Build script for tenki-node
//!
//! Validates the embedded node.toml at compile time.

use std::fs;
use std::path::Path;

fn main() {
    validate_config();
}

/// Validate node.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=node.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("node.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The node embeds node.toml as its default configuration.         ║\n\
            ║  Please create one in the tenki-node directory.                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read node.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in node.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_node(&config, &mut errors);
    validate_schedule(&config, &mut errors);
    validate_collector(&config, &mut errors);
    validate_presenter(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in node.toml                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=node.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated: String = if line.chars().count() > 64 {
                line.chars().take(61).chain("...".chars()).collect()
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn positive(section: &toml::Table, name: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(toml::Value::Integer(value)) = section.get(key) {
        if *value <= 0 {
            errors.push(format!("[{}] {} must be > 0", name, key));
        }
    }
}

/// `[node]` is the only mandatory section
fn validate_node(config: &toml::Value, errors: &mut Vec<String>) {
    let node = match config.get("node") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[node] must be a table".into());
            return;
        }
        None => {
            errors.push("Missing [node] section".into());
            return;
        }
    };

    match node.get("role") {
        Some(toml::Value::String(role)) => {
            if !["collector", "presenter"].contains(&role.as_str()) {
                errors.push("[node] role must be 'collector' or 'presenter'".into());
            }
        }
        _ => errors.push("[node] missing 'role'".into()),
    }

    if let Some(toml::Value::Integer(port)) = node.get("http_port") {
        if !(1..=65535).contains(port) {
            errors.push("[node] http_port must be 1-65535".into());
        }
    }
}

fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(toml::Value::Table(schedule)) = config.get("schedule") {
        positive(schedule, "schedule", "refresh_interval_s", errors);
        positive(schedule, "schedule", "clock_interval_ms", errors);
    }
}

fn validate_collector(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(toml::Value::Table(collector)) = config.get("collector") else {
        return;
    };

    positive(collector, "collector", "forecast_capacity", errors);
    positive(collector, "collector", "feed_capacity", errors);
    positive(collector, "collector", "handshake_timeout_s", errors);

    for (key, placeholder) in [("forecast_url", "{area_code}"), ("feed_url", "{channel_id}")] {
        if let Some(toml::Value::String(url)) = collector.get(key) {
            if !url.contains(placeholder) {
                errors.push(format!("[collector] {} must contain {}", key, placeholder));
            }
        }
    }
}

fn validate_presenter(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(toml::Value::Table(presenter)) = config.get("presenter") {
        positive(presenter, "presenter", "document_capacity", errors);
    }
}
