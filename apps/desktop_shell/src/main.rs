mod backend_bridge;
mod config;
mod controller;
mod render_host;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, resolve_startup_config, Args};
use crate::controller::SessionController;
use crate::render_host::{ProbeRenderHost, RenderHost};
use crate::ui::ShellApp;

const APP_NAME: &str = "Rflow AI Assistant";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let startup = resolve_startup_config(args, load_settings());
    tracing::info!(
        render_url = %startup.render_url,
        backend_url = startup.backend_url.as_deref().unwrap_or("<none>"),
        ipc_port = startup.ipc_port,
        "starting shell"
    );

    let controller = SessionController::initialize(startup, |ui_tx| {
        let host: Box<dyn RenderHost> = Box::new(ProbeRenderHost::new(ui_tx)?);
        Ok(host)
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(controller.window_title())
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    // The app owns the controller; dropping it on exit runs shutdown.
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(ShellApp::new(controller)))),
    )
    .map_err(|err| anyhow!("window event loop failed: {err}"))
}
