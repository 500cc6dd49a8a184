use anyhow::Context;
use clap::Parser;
use printerscreen::{
    init_logging, initial_query_path, replay, splash_message, subscription_request, PrinterModel,
    PrinterState, ScreenConfig, BUILD_DATE, VERSION,
};
use printerscreen_core::Subsystem;
use serde_json::json;
use std::path::PathBuf;

/// Touchscreen front-end for a 3D-printer control host.
#[derive(Parser, Debug)]
#[command(name = "printerscreen", version, about)]
struct Cli {
    /// Screen configuration file (.toml or .json)
    #[arg(short = 'c', long = "configfile", env = "PRINTERSCREEN_CONFIG")]
    configfile: Option<PathBuf>,

    /// Replay recorded host traffic from a JSON-lines file
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    tracing::info!("PrinterScreen {} (built {})", VERSION, BUILD_DATE);

    let config_path = cli.configfile.unwrap_or_else(ScreenConfig::default_path);
    let config = ScreenConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    tracing::info!(
        "Host {}:{}",
        config.main.moonraker_host,
        config.main.moonraker_port
    );
    let control = config.temperature.control()?;

    let mut model = PrinterModel::new();
    for state in PrinterState::ALL {
        model.set_callback(state, move || tracing::info!("Printer is now {}", state));
    }

    let Some(replay_path) = cli.replay else {
        tracing::info!("Initial query: {}", initial_query_path());
        tracing::info!("No replay file given, nothing to do");
        return Ok(());
    };

    let summary = replay::run_file(&mut model, &replay_path)?;

    let state = model.get_state();
    let state_message = model
        .get_stat_field(Subsystem::Webhooks, "state_message")
        .and_then(|message| message.as_str());
    let output = json!({
        "state": state,
        "splash": splash_message(state, state_message),
        "firmware": model.get_klipper_version(),
        "tools": model.get_tools(),
        "active_heater": control.active_heater(&model),
        "subscription": subscription_request(&model),
        "status": model.get_printer_status_data().to_value(),
        "replay": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
