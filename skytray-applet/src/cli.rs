use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

use skytray_core::{
    Config, IpLocator, LocationSource, OpenMeteoProvider, Published, RefreshInterval,
    RefreshScheduler, RefreshState, UnitPreference, WeatherModel, WeatherProvider,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skytray", version, about = "System-tray weather applet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the applet: periodic refresh, menu output on every update (default).
    Run,

    /// Fetch the weather once, print the menu, and exit.
    Show,

    /// Interactively edit preferences (unit, interval, zipcode).
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Run) {
            Command::Run => run().await,
            Command::Show => show().await,
            Command::Configure => configure(),
        }
    }
}

/// Long-lived applet loop. SIGUSR1 stands in for the menu's "Refresh Now"
/// entry; SIGINT/SIGTERM exit cleanly.
async fn run() -> Result<()> {
    let config = Config::load_or_default();
    let prefs = config.preferences();
    tracing::info!(
        unit = ?prefs.unit,
        interval_minutes = prefs.interval.minutes(),
        zipcode = config.zipcode.as_deref().unwrap_or("<ip detection>"),
        "starting skytray"
    );

    let location: Arc<dyn LocationSource> =
        Arc::new(IpLocator::new(config.http_timeout(), config.zipcode.clone())?);
    let provider: Arc<dyn WeatherProvider> =
        Arc::new(OpenMeteoProvider::new(config.http_timeout())?);

    // The sender side is where menu-driven preference changes would arrive;
    // the scheduler picks them up at the next cycle boundary.
    let (_prefs_tx, prefs_rx) = watch::channel(prefs);
    let (scheduler, handle) = RefreshScheduler::new(location, provider, prefs_rx);
    let worker = tokio::spawn(scheduler.run());

    let mut published = handle.subscribe();
    let mut refresh_signal =
        signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("termination requested, shutting down");
                break;
            }
            _ = refresh_signal.recv() => {
                tracing::debug!("SIGUSR1 received, requesting refresh");
                handle.request_refresh();
            }
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = published.borrow_and_update().clone();
                present(&snapshot);
            }
        }
    }

    worker.abort();
    Ok(())
}

fn present(snapshot: &Published) {
    match &snapshot.state {
        RefreshState::Idle => {}
        RefreshState::Fetching => tracing::debug!("refresh in progress"),
        RefreshState::Succeeded => {
            if let Some(model) = &snapshot.model {
                print_model(model);
            }
        }
        RefreshState::Failed(reason) => {
            // Previous menu content stays valid; just flag the failed update.
            println!("(last update failed: {reason})");
        }
    }
}

fn print_model(model: &WeatherModel) {
    println!("{}", render::tray_label(model));
    for line in render::menu_lines(model) {
        println!("  {line}");
    }
}

/// One refresh cycle in the foreground, without the scheduler.
async fn show() -> Result<()> {
    let config = Config::load_or_default();
    let prefs = config.preferences();

    let locator = IpLocator::new(config.http_timeout(), config.zipcode.clone())?;
    let provider = OpenMeteoProvider::new(config.http_timeout())?;

    let location = locator.resolve().await?;
    let raw = provider.fetch(location.coordinates, prefs.unit).await?;
    let model = WeatherModel::normalize(location.label, &raw.current, &raw.forecast, prefs.unit);

    print_model(&model);
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load_or_default();

    let unit_labels = vec!["Imperial (°F)", "Celsius (°C)"];
    let cursor = match config.unit {
        UnitPreference::Imperial => 0,
        UnitPreference::Celsius => 1,
    };
    let picked = inquire::Select::new("Temperature unit:", unit_labels)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Unit selection aborted")?;
    config.unit = if picked.starts_with("Imperial") {
        UnitPreference::Imperial
    } else {
        UnitPreference::Celsius
    };

    let intervals: Vec<u32> = RefreshInterval::all().iter().map(|i| i.minutes()).collect();
    let cursor = intervals
        .iter()
        .position(|m| *m == config.interval_minutes)
        .unwrap_or(0);
    config.interval_minutes = inquire::Select::new("Update interval (minutes):", intervals)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Interval selection aborted")?;

    let zipcode = inquire::Text::new("Zipcode override (leave empty for IP detection):")
        .with_initial_value(config.zipcode.as_deref().unwrap_or(""))
        .prompt()
        .context("Zipcode entry aborted")?;
    config.zipcode = match zipcode.trim() {
        "" => None,
        zip => Some(zip.to_string()),
    };

    config.save()?;
    println!("Preferences saved to {}", Config::config_file_path()?.display());
    Ok(())
}
