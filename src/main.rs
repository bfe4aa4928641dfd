mod api;
mod app;
mod config;
mod layout;
mod task;
mod tree;
mod util;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Args;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skill_constellation=info,warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let config = Args::parse().into_config()?;
    let backend = api::connect(&config.source).context("could not set up the course backend")?;
    info!(
        course = %config.course_id,
        source = %config.source_label(),
        editor = config.editor_mode,
        "starting skill constellation"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Skill Constellation",
        options,
        Box::new(move |cc| Ok(Box::new(app::SkillTreeApp::new(cc, config, backend)))),
    )
    .map_err(|error| anyhow!("window closed with an error: {error}"))
}
