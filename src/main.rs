mod catalog;
mod config;
mod interaction;
mod observer;
mod shutdown;
mod sky;
mod sources;
#[cfg(test)]
mod test_support;
mod web;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::interaction::InteractionController;
use crate::observer::{ObserverState, WebGeocoder};
use crate::shutdown::Shutdown;
use crate::sky::{Runner, SimClock, SkyState, Sgp4Propagator, VisibilityEngine};
use crate::sources::{build_catalog, ensure_cache_dir, FreshnessStore, SourceCache, SourceReport};
use crate::web::{AppState, DashboardSettings};

const FRESHNESS_FILE: &str = "freshness.yaml";

#[derive(Parser)]
#[command(name = "sat-o-sky")]
#[command(about = "Plot every catalogued satellite above your horizon")]
struct Cli {
    /// Configuration file
    #[arg(long, short, global = true, default_value = config::DEFAULT_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the live sky plot
    Serve {
        /// Place name or coordinates; prompts when omitted
        #[arg(long)]
        location: Option<String>,
        /// Override the configured listen address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Refresh every TLE source and report what was loaded
    Fetch,
    /// Print the bodies above the horizon at one instant
    Snapshot {
        #[arg(long)]
        location: Option<String>,
        /// RFC 3339 instant, defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::load(&cli.config);

    match cli.command {
        Commands::Serve { location, bind } => serve(config, location, bind).await,
        Commands::Fetch => fetch(config).await,
        Commands::Snapshot { location, at } => snapshot(config, location, at).await,
    }
}

async fn serve(config: Config, location: Option<String>, bind: Option<String>) -> ExitCode {
    let Some(observer) = resolve_observer(&config, location).await else {
        return ExitCode::FAILURE;
    };
    let Some((catalog, reports)) = load_catalog(&config).await else {
        return ExitCode::FAILURE;
    };

    let sky = SkyState::shared(catalog);
    let shutdown = Shutdown::new();

    let runner = Runner {
        sky: sky.clone(),
        engine: VisibilityEngine::new(Sgp4Propagator::default(), config.color_picked.clone()),
        observer: observer.clone(),
        clock: SimClock::new(config.seconds_per_step, Utc::now()),
        pause: config.update_pause,
        shutdown: shutdown.clone(),
    };
    let ticker = tokio::spawn(runner.run());

    let signals = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signals.trigger("interrupted");
        }
    });

    let state = AppState {
        controller: Arc::new(InteractionController::new(sky.clone(), config.pick_interval)),
        sky,
        observer: Arc::new(observer),
        reports: Arc::new(reports),
        dashboard: Arc::new(DashboardSettings::from_config(&config)),
        shutdown: shutdown.clone(),
    };

    let bind = bind.unwrap_or_else(|| config.bind.clone());
    let result = web::run_server(state, &bind).await;
    shutdown.trigger("server stopped");
    if let Err(e) = ticker.await {
        log::error!("Tick loop failed: {}", e);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error on {}: {}", bind, e);
            ExitCode::FAILURE
        }
    }
}

async fn fetch(config: Config) -> ExitCode {
    let Some((catalog, reports)) = load_catalog(&config).await else {
        return ExitCode::FAILURE;
    };

    for report in &reports {
        let status = match (&report.error, report.status) {
            (Some(e), _) => format!("failed: {}", e),
            (None, Some(status)) => format!("{:?}", status).to_lowercase(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<28} {:>6} loaded {:>5} rejected  {}",
            report.name, report.records, report.rejected, status
        );
    }
    println!("{} unique bodies", catalog.len());
    ExitCode::SUCCESS
}

async fn snapshot(config: Config, location: Option<String>, at: Option<DateTime<Utc>>) -> ExitCode {
    let Some(observer) = resolve_observer(&config, location).await else {
        return ExitCode::FAILURE;
    };
    let Some((catalog, _)) = load_catalog(&config).await else {
        return ExitCode::FAILURE;
    };

    let instant = at.unwrap_or_else(Utc::now);
    let mut engine = VisibilityEngine::new(Sgp4Propagator::default(), config.color_picked.clone());
    let frame = engine.tick(&catalog, &observer, instant);

    println!(
        "{} of {} bodies above the horizon at {} from {}",
        frame.len(),
        catalog.len(),
        instant.to_rfc3339(),
        observer
    );
    println!(
        "{:<5} {:<26} {:<8} {:>8} {:>7} {:>8} {:>8}",
        "#", "name", "catalog", "az", "alt", "ra", "dec"
    );
    for entry in &frame.entries {
        println!(
            "{:<5} {:<26} {:<8} {:>8.2} {:>7.2} {:>8.2} {:>8.2}",
            entry.plot_index,
            entry.name,
            entry.catalog_number,
            entry.azimuth_deg,
            entry.altitude_deg,
            entry.right_ascension_deg,
            entry.declination_deg
        );
    }
    ExitCode::SUCCESS
}

async fn resolve_observer(config: &Config, location: Option<String>) -> Option<ObserverState> {
    let geocoder = match WebGeocoder::new(&config.user_agent) {
        Ok(g) => g,
        Err(e) => {
            log::error!("Failed to set up geocoder: {}", e);
            return None;
        }
    };

    let resolved = match location {
        Some(text) => observer::resolve(&text, &geocoder).await,
        None => observer::prompt(&geocoder, &config.default_location).await,
    };
    match resolved {
        Ok(observer) => {
            log::info!("Observer at {}", observer);
            Some(observer)
        }
        Err(e) => {
            log::error!("No observer location: {}", e);
            None
        }
    }
}

/// Fetches every configured source and persists what was learned about
/// them for the next run.
async fn load_catalog(config: &Config) -> Option<(Catalog, Vec<SourceReport>)> {
    if let Err(e) = ensure_cache_dir(&config.cache_dir) {
        log::error!(
            "Cache directory {} is not usable: {}",
            config.cache_dir.display(),
            e
        );
        return None;
    }
    let cache = match SourceCache::new(config.cache_dir.clone(), &config.user_agent) {
        Ok(cache) => cache,
        Err(e) => {
            log::error!("Failed to set up HTTP client: {}", e);
            return None;
        }
    };

    let freshness_path = config.cache_dir.join(FRESHNESS_FILE);
    let mut freshness = FreshnessStore::load(&freshness_path);
    let mut sources = config.sources.clone();
    freshness.apply(&mut sources);

    let (catalog, reports) = build_catalog(&cache, &mut sources).await;

    freshness.record(&sources);
    if let Err(e) = freshness.save(&freshness_path) {
        log::warn!("Failed to save {}: {}", freshness_path.display(), e);
    }
    Some((catalog, reports))
}
