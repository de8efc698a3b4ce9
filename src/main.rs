mod app;
mod config;
mod error;
mod event;
mod host;
mod session;
mod theme;
mod ui;
mod widget;

use app::CourseDeckApp;
use clap::Parser;
use config::{Cli, HostConfig};
use eframe::egui;
use host::sandbox::SandboxHost;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref());

    let config = HostConfig::from_cli(&cli)?;
    tracing::info!(
        widget = config.widget.as_str(),
        turn = %config.turn_id,
        persisted = config.state_dir.is_some(),
        "starting sandbox host"
    );

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("coursedeck-runtime")
        .build()?;

    let host = SandboxHost::start(&config, runtime.handle().clone(), tx);
    let widget = config.widget;
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Coursedeck",
        native_options,
        Box::new(move |creation_context| {
            Ok(Box::new(CourseDeckApp::new(
                &creation_context.egui_ctx,
                rx,
                host,
                widget,
            )))
        }),
    )?;

    Ok(())
}
