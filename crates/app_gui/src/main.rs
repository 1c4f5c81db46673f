use anyhow::Context;
use clap::Parser;
use classify_core::AppConfig;
use eframe::NativeOptions;
use std::path::PathBuf;

mod app;

#[derive(Parser, Debug)]
#[command(name = "Scout")]
#[command(about = "Drop a photo and let the classification server say who it is")]
struct Args {
    /// TOML config file; defaults to the per-user config when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer from a canned classifier instead of the server
    #[arg(long)]
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = AppConfig::load_or_default(args.config.as_deref())
        .context("could not load configuration")?;
    let ui = app::UiApp::new(config, args.config, args.demo)?;
    tracing::info!(
        "Scout {} talking to {}",
        env!("SCOUT_VERSION"),
        ui.endpoint_description()
    );

    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        "Scout",
        options,
        Box::new(|_cc| Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(ui))),
    ) {
        eprintln!("Scout stopped with an error: {e}");
    }
    Ok(())
}
