use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub controller_url: String,
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub geolocation_available: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller_url: "http://127.0.0.1:80".into(),
            endpoint: "ajax-thrift.php".into(),
            request_timeout_ms: 5000,
            geolocation_available: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    controller_url: Option<String>,
    endpoint: Option<String>,
    request_timeout_ms: Option<u64>,
    geolocation_available: Option<bool>,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.controller_url {
            self.controller_url = v;
        }
        if let Some(v) = file.endpoint {
            self.endpoint = v;
        }
        if let Some(v) = file.request_timeout_ms {
            self.request_timeout_ms = v;
        }
        if let Some(v) = file.geolocation_available {
            self.geolocation_available = v;
        }
    }

    /// Later keys win, so `APP__*` overrides the older `CONSOLE_*` names.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CONSOLE_CONTROLLER_URL") {
            self.controller_url = v;
        }
        if let Some(v) = lookup("APP__CONTROLLER_URL") {
            self.controller_url = v;
        }

        if let Some(v) = lookup("APP__ENDPOINT") {
            self.endpoint = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_ms = parsed;
            }
        }

        if let Some(v) = lookup("APP__GEOLOCATION") {
            if let Some(parsed) = parse_flag(&v) {
                self.geolocation_available = parsed;
            }
        }
    }
}

/// Defaults, then the TOML file, then the environment. A missing default
/// file is fine; a missing file the operator named is not.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file = parse_file_settings(&raw)
                .with_context(|| format!("invalid console config '{}'", path.display()))?;
            settings.apply_file(file);
        }
        Err(err) if config_path.is_none() && err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read console config '{}'", path.display()));
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str(raw)?)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
