use std::sync::Arc;

use alert_scanner::AlertScanner;
use anyhow::{Context, Result};
use catalog_store::{CatalogStore, HttpCatalogSource, JsonFileSource, SeedCatalog};
use match_engine::MatchEngine;
use profile_store::ProfileStore;
use scholar_core::{Alert, AlertSettings, CatalogSource, ProfileStorage, SettingsStorage, UserProfile};
use scholar_persistence::JsonFileStorage;
use search_engine::SearchEngine;
use tokio::signal::unix::SignalKind;

mod config;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Panic hook: log panic info before crashing
    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    tracing::info!("Starting ScholarIQ Agent");

    // 2. Load configuration
    let config = AgentConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Data dir: {}", config.data_dir.display());

    // 3. Load the catalog; there is no session without one
    let source = catalog_source(&config);
    let opportunities = source
        .load()
        .await
        .with_context(|| format!("failed to load catalog from source '{}'", source.name()))?;
    tracing::info!(
        "Catalog loaded: {} opportunities from '{}'",
        opportunities.len(),
        source.name()
    );
    let catalog = CatalogStore::new(opportunities);

    // 4. Saved profile and settings; missing or unreadable blobs fall back
    //    to fresh defaults
    let profile_storage: Arc<dyn ProfileStorage> =
        Arc::new(JsonFileStorage::<UserProfile>::new(config.profile_path()));
    let profiles = ProfileStore::load(profile_storage).await;
    match profiles.current() {
        Some(p) if p.is_complete() => {
            tracing::info!("Profile complete, matching by field of study")
        }
        Some(_) => tracing::info!("Profile incomplete, serving the default list"),
        None => tracing::info!("No profile yet, serving the default list"),
    }

    let settings_storage: Arc<dyn SettingsStorage> =
        Arc::new(JsonFileStorage::<AlertSettings>::new(config.settings_path()));
    let settings = settings_storage.load().await.unwrap_or_default();
    tracing::info!(
        "Alert settings: ${:.0}-${:.0}, {} scan",
        settings.min_amount,
        settings.max_amount,
        settings.scan_frequency.as_str()
    );

    // 5. Wire the engines to the stores
    let mut matches_rx = MatchEngine::new(catalog.subscribe(), profiles.subscribe()).spawn();
    tracing::info!(
        "Match engine ready: {} initial matches",
        matches_rx.borrow_and_update().len()
    );

    let search = SearchEngine::new(catalog.subscribe());
    let mut results_rx = search.results();

    let scanner = AlertScanner::new(catalog.subscribe(), profiles.subscribe())
        .with_settings(settings)
        .with_storage(settings_storage);

    // First scan right away, then the periodic schedule takes over
    scanner.scan_now();
    scanner.start();

    let stats = scanner.stats();
    tracing::info!(
        "First scan: {} alerts, {} unread, match rate {}%",
        scanner.alerts().borrow().len(),
        stats.unread_count,
        stats.match_rate
    );

    // Search warm-up: push the top seed query through the debounce path.
    // The query lands in recent searches, deliberately: a fresh session
    // starts with one suggestion instead of an empty history.
    let warmup_query = search.popular_queries()[0];
    search.submit_query(warmup_query);
    results_rx
        .changed()
        .await
        .context("search engine closed during warm-up")?;
    tracing::info!(
        "Search warm-up: '{}' matched {} opportunities",
        warmup_query,
        results_rx.borrow_and_update().len()
    );

    tracing::info!(
        "Agent is now running. Scanning every {}s. Press Ctrl+C to stop.",
        scanner.settings().scan_frequency.interval().as_secs()
    );

    // 6. Main loop with graceful shutdown (SIGINT + SIGTERM)
    let mut alerts_rx = scanner.alerts();
    let mut last_announced = highest_alert_id(&alerts_rx.borrow_and_update());

    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = alerts_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = alerts_rx.borrow_and_update().clone();
                last_announced = announce_alerts(&scanner, &snapshot, last_announced);
            }
            changed = matches_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!(
                    "Matches updated: {} opportunities",
                    matches_rx.borrow_and_update().len()
                );
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, exiting gracefully...");
                break;
            }
        }
    }

    // 7. Release the scan schedule before exit
    scanner.stop();
    let stats = scanner.stats();
    tracing::info!(
        "ScholarIQ agent shut down ({} alerts, {} unread).",
        scanner.alerts().borrow().len(),
        stats.unread_count
    );
    Ok(())
}

/// Pick the catalog source: remote URL wins, then a local file, then the
/// bundled seed set.
fn catalog_source(config: &AgentConfig) -> Box<dyn CatalogSource> {
    if let Some(url) = &config.catalog_url {
        Box::new(HttpCatalogSource::new(url.clone()))
    } else if let Some(path) = &config.catalog_path {
        Box::new(JsonFileSource::new(path.clone()))
    } else {
        Box::new(SeedCatalog)
    }
}

/// Log alerts newer than the watermark as console notifications, honoring
/// the notification toggles. The log line is the delivery; real push and
/// email channels are out of scope.
fn announce_alerts(scanner: &AlertScanner, alerts: &[Alert], last_announced: u64) -> u64 {
    let settings = scanner.settings();
    let mut highest = last_announced;

    for alert in alerts.iter().filter(|a| a.id > last_announced) {
        highest = highest.max(alert.id);
        if alert.is_urgent() {
            if settings.notify_deadlines {
                tracing::warn!(
                    "Deadline approaching: {} ({}% match)",
                    alert.title,
                    alert.match_percentage
                );
            }
        } else if settings.notify_new_matches {
            tracing::info!(
                "New match: {} ({}% match, {} urgency)",
                alert.title,
                alert.match_percentage,
                alert.urgency.as_str()
            );
        }
    }

    if highest > last_announced {
        let stats = scanner.stats();
        tracing::info!(
            "Alert digest: {} unread, {} today, {} this week, match rate {}%",
            stats.unread_count,
            stats.today_alerts,
            stats.week_alerts,
            stats.match_rate
        );
    }
    highest
}

/// Newest-first list, but ids ascend within a batch; take the max.
fn highest_alert_id(alerts: &[Alert]) -> u64 {
    alerts.iter().map(|a| a.id).max().unwrap_or(0)
}
