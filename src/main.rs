mod app;
mod audio;
mod cli;
mod config;
mod error;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::{NativeOptions, egui};
use std::path::PathBuf;

use app::BarVisualizer;
use cli::Cli;
use config::{Config, DEFAULT_CONFIG_FILE};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    });

    let mut config = match config_path {
        Some(ref path) => {
            let config = Config::load(path)?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };
    config.merge_cli(&cli);
    config.validate().context("Invalid configuration")?;

    let source = config.player.source.clone();
    let audio = audio::decode::decode_file(&source)
        .with_context(|| format!("Failed to load audio file: {}", source.display()))?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_maximized(true),
        ..Default::default()
    };

    eframe::run_native(
        "BarViz",
        options,
        Box::new(move |cc| Ok(Box::new(BarVisualizer::new(cc, audio, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start application: {}", e))?;

    Ok(())
}
