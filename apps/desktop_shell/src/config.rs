use std::{fs, path::Path, time::Duration};

use clap::Parser;
use client_core::DEFAULT_REQUEST_TIMEOUT;
use serde::Deserialize;
use shared::protocol::DEFAULT_IPC_PORT;

use crate::controller::StartupConfig;

pub const SETTINGS_FILE: &str = "shell.toml";

#[derive(Parser, Debug)]
#[command(name = "rflow-shell", about = "Desktop shell for the Rflow chat application")]
pub struct Args {
    /// URL of the chat application to display.
    pub render_url: String,
    /// Backend API endpoint that receives user messages.
    pub api_url: Option<String>,
    /// Environment URL, used to label the window.
    pub env_url: Option<String>,
    /// Loopback port the backend pushes assistant messages to.
    #[arg(long)]
    pub ipc_port: Option<u16>,
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ipc_port: u16,
    pub backend_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ipc_port: DEFAULT_IPC_PORT,
            backend_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    ipc_port: Option<u16>,
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.ipc_port {
                    settings.ipc_port = v;
                }
                if let Some(v) = file_cfg.backend_url {
                    settings.backend_url = Some(v);
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring malformed settings file: {err}");
            }
        }
    }

    if let Some(v) = env("RFLOW_IPC_PORT") {
        match v.trim().parse::<u16>() {
            Ok(port) => settings.ipc_port = port,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid RFLOW_IPC_PORT"),
        }
    }
    if let Some(v) = env("RFLOW_BACKEND_URL") {
        settings.backend_url = Some(v);
    }
    if let Some(v) = env("RFLOW_REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(secs) => settings.request_timeout_secs = secs,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid RFLOW_REQUEST_TIMEOUT_SECS"),
        }
    }

    settings
}

/// Command-line arguments win over settings from file and environment.
pub fn resolve_startup_config(args: Args, settings: Settings) -> StartupConfig {
    let backend_url = args
        .api_url
        .or(settings.backend_url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let timeout_secs = args
        .request_timeout_secs
        .unwrap_or(settings.request_timeout_secs)
        .max(1);

    StartupConfig {
        render_url: args.render_url,
        backend_url,
        environment_url: args.env_url,
        ipc_port: args.ipc_port.unwrap_or(settings.ipc_port),
        request_timeout: Duration::from_secs(timeout_secs),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
