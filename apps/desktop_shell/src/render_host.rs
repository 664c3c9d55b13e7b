//! Render host seam: the embedded page the shell points at.
//!
//! The controller only needs to load a URL, run a script and release the
//! host on shutdown. Navigation outcomes come back through the UI event
//! queue as [`UiEvent::LoadStarted`] / [`UiEvent::LoadFinished`].

use std::time::Duration;

use anyhow::{bail, Context};
use crossbeam_channel::Sender;
use tokio::{runtime::Runtime, task::JoinHandle};

use crate::controller::events::UiEvent;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);

pub trait RenderHost: Send {
    fn load_url(&mut self, url: &str);
    fn run_script(&mut self, script: &str) -> anyhow::Result<()>;
    fn release(&mut self);
}

/// Render host without an embedded engine: a navigation is a GET against
/// the page URL, and a 2xx/3xx answer counts as loaded.
pub struct ProbeRenderHost {
    runtime: Option<Runtime>,
    http: reqwest::Client,
    ui_tx: Sender<UiEvent>,
    navigation: Option<JoinHandle<()>>,
    scripts: Vec<String>,
}

impl ProbeRenderHost {
    pub fn new(ui_tx: Sender<UiEvent>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("render-probe")
            .enable_all()
            .build()
            .context("failed to build render host runtime")?;
        let http = reqwest::Client::builder()
            .timeout(NAVIGATION_TIMEOUT)
            .build()
            .context("failed to build render host http client")?;
        Ok(Self {
            runtime: Some(runtime),
            http,
            ui_tx,
            navigation: None,
            scripts: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn injected_scripts(&self) -> &[String] {
        &self.scripts
    }
}

impl RenderHost for ProbeRenderHost {
    fn load_url(&mut self, url: &str) {
        let Some(runtime) = &self.runtime else {
            tracing::debug!(%url, "render host released; navigation ignored");
            return;
        };
        if let Some(previous) = self.navigation.take() {
            previous.abort();
        }

        let _ = self.ui_tx.try_send(UiEvent::LoadStarted);
        let http = self.http.clone();
        let ui_tx = self.ui_tx.clone();
        let url = url.to_string();
        self.navigation = Some(runtime.spawn(async move {
            let success = match http.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(%url, %status, "navigation answered");
                    status.is_success() || status.is_redirection()
                }
                Err(err) => {
                    tracing::warn!(%url, error = %err, "navigation failed");
                    false
                }
            };
            // The outcome is the only way out of Loading, so wait for queue space.
            if tokio::task::block_in_place(|| ui_tx.send(UiEvent::LoadFinished { success }))
                .is_err()
            {
                tracing::debug!(%url, "ui queue closed; navigation outcome dropped");
            }
        }));
    }

    fn run_script(&mut self, script: &str) -> anyhow::Result<()> {
        if self.runtime.is_none() {
            bail!("render host already released");
        }
        tracing::debug!(bytes = script.len(), "recorded injected script");
        self.scripts.push(script.to_string());
        Ok(())
    }

    fn release(&mut self) {
        if let Some(navigation) = self.navigation.take() {
            navigation.abort();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            tracing::debug!("render host released");
        }
    }
}

impl Drop for ProbeRenderHost {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "tests/render_host_tests.rs"]
mod tests;
