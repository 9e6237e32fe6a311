//! Live match alerts
//!
//! Polls the fixture feed for one league, detects new goals and corners
//! against persisted state, and forwards alerts to Telegram (or the log).
//!
//! One invocation is one poll cycle. Scheduling is left to cron or a CI
//! workflow; the process exits cleanly even when the cycle hits trouble.

use tracing::{error, info, warn};

use live_match_alerts::alerts::engine::{CycleEngine, CycleReport, EngineConfig};
use live_match_alerts::api::client::FootballClient;
use live_match_alerts::config::Settings;
use live_match_alerts::notify;
use live_match_alerts::state::state_store::StateStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load configuration.
    let settings = Settings::from_env();

    // Initialize logging.
    init_logging(&settings);

    info!(
        league_id = settings.league_id,
        corners_every_n = settings.corner_cadence(),
        goal_alerts = settings.goal_alerts,
        corner_alerts = settings.corner_alerts,
        simulate = settings.simulate,
        state_dir = %settings.state_dir.display(),
        "Configuration loaded"
    );

    if let Err(errors) = settings.validate() {
        for e in &errors {
            warn!(error = %e, "Configuration problem");
        }
    }

    // Run the cycle in its own task so a panic is contained here too.
    match tokio::spawn(run(settings)).await {
        Ok(Ok(report)) => {
            info!(
                loop_count = report.loop_count,
                alerts = report.alerts_sent(),
                "Run finished"
            );
        }
        Ok(Err(e)) => error!(error = %e, "Cycle aborted"),
        Err(e) => error!(error = %e, "Cycle panicked"),
    }
}

async fn run(settings: Settings) -> anyhow::Result<CycleReport> {
    let client = FootballClient::from_settings(&settings)?;
    let notifier = notify::from_settings(&settings);
    let store = StateStore::new(settings.state_dir.clone());

    let engine = CycleEngine::new(
        EngineConfig::from(&settings),
        Box::new(client),
        notifier,
        store,
    );

    Ok(engine.run_cycle().await)
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
