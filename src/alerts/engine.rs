//! Cycle engine: one poll of the live fixtures, start to finish.
//!
//! Flow per cycle:
//! 1. Load state and persist the bumped cycle counter.
//! 2. Simulate mode: send the demo alerts and stop.
//! 3. Fetch live fixtures for the league.
//! 4. Per active fixture: goal alerts, then corner alerts on corner cycles.
//! 5. Save state once.
//!
//! A failing fixture is logged and skipped; it never stops the others and
//! never discards what earlier fixtures changed.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::errors::ApiError;
use crate::config::Settings;
use crate::data::models::{Fixture, GoalEvent, ModelError, RawFixture, TeamStatistics};
use crate::data::provider::FixtureProvider;
use crate::notify::format;
use crate::notify::notifier::Notifier;
use crate::state::state_store::{AlertState, StateStore};

use super::corners::{corner_alerts, is_corner_cycle};
use super::goals::{goal_alerts, GoalAlert};

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("malformed fixture payload: {0}")]
    Malformed(#[from] ModelError),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub league_id: i64,
    pub goal_alerts: bool,
    pub corner_alerts: bool,
    /// Corner counts are checked when `loop % corner_cadence == 0`.
    pub corner_cadence: u64,
    pub simulate: bool,
    pub diag: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            league_id: 39,
            goal_alerts: true,
            corner_alerts: true,
            corner_cadence: 2,
            simulate: false,
            diag: false,
        }
    }
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            league_id: settings.league_id,
            goal_alerts: settings.goal_alerts,
            corner_alerts: settings.corner_alerts,
            corner_cadence: settings.corner_cadence(),
            simulate: settings.simulate,
            diag: settings.diag,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub loop_count: u64,
    pub simulated: bool,
    pub fixtures_seen: usize,
    pub fixtures_processed: usize,
    pub fixtures_skipped: usize,
    pub fixtures_failed: usize,
    pub goal_alerts: usize,
    pub generic_goal_alerts: usize,
    pub corner_alerts: usize,
    pub delivery_failures: usize,
    pub state_saved: bool,
}

impl CycleReport {
    pub fn alerts_sent(&self) -> usize {
        self.goal_alerts + self.generic_goal_alerts + self.corner_alerts
    }
}

/// Runs poll cycles against a provider, a notifier and a state store.
pub struct CycleEngine {
    config: EngineConfig,
    provider: Box<dyn FixtureProvider>,
    notifier: Box<dyn Notifier>,
    store: StateStore,
}

impl CycleEngine {
    pub fn new(
        config: EngineConfig,
        provider: Box<dyn FixtureProvider>,
        notifier: Box<dyn Notifier>,
        store: StateStore,
    ) -> Self {
        Self {
            config,
            provider,
            notifier,
            store,
        }
    }

    /// Run exactly one cycle. Never fails: every problem is logged and
    /// reflected in the report.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut state = self.store.load();
        let mut report = CycleReport {
            loop_count: state.meta.loop_count,
            ..CycleReport::default()
        };

        if let Err(e) = self.store.save_meta(&state.meta) {
            warn!(error = %e, "Failed to persist cycle counter");
        }

        if self.config.simulate {
            for text in format::SIMULATED_ALERTS {
                self.deliver(text, &mut report).await;
            }
            report.simulated = true;
            info!(loop_count = report.loop_count, "Simulation alerts sent");
            return report;
        }

        let fixtures = self.fetch_live_fixtures().await;
        report.fixtures_seen = fixtures.len();

        if self.config.diag {
            log_fixtures(&fixtures);
        }

        if fixtures.is_empty() {
            info!(league_id = self.config.league_id, "No live fixtures");
        }

        for raw in fixtures {
            match self.process_fixture(&mut state, raw, &mut report).await {
                Ok(true) => report.fixtures_processed += 1,
                Ok(false) => report.fixtures_skipped += 1,
                Err(e) => {
                    warn!(error = %e, "Fixture processing failed, skipping");
                    report.fixtures_failed += 1;
                }
            }
        }

        match self.store.save(&state) {
            Ok(()) => report.state_saved = true,
            Err(e) => error!(error = %e, state_dir = %self.store.dir().display(), "Failed to save state"),
        }

        info!(
            loop_count = report.loop_count,
            fixtures = report.fixtures_seen,
            processed = report.fixtures_processed,
            failed = report.fixtures_failed,
            alerts = report.alerts_sent(),
            delivery_failures = report.delivery_failures,
            finished_at = %Utc::now().format("%Y-%m-%d %H:%M:%S"),
            "Cycle complete"
        );

        report
    }

    /// Returns `Ok(false)` for fixtures that are not in play.
    async fn process_fixture(
        &self,
        state: &mut AlertState,
        raw: RawFixture,
        report: &mut CycleReport,
    ) -> Result<bool, FixtureError> {
        let fixture = Fixture::try_from(raw)?;

        if fixture
            .league_id
            .is_some_and(|id| id != self.config.league_id)
        {
            debug!(fixture_id = fixture.id, league_id = ?fixture.league_id, "Other league, skipping");
            return Ok(false);
        }

        if !fixture.status.is_active() {
            debug!(fixture_id = fixture.id, status = %fixture.status, "Fixture not in play, skipping");
            return Ok(false);
        }

        if self.config.goal_alerts {
            let events = self.fetch_goal_events(fixture.id).await;
            for alert in goal_alerts(state, &fixture, &events) {
                match alert {
                    GoalAlert::Detailed(event) => {
                        debug!(
                            fixture_id = fixture.id,
                            team = fixture.team_name(event.team_id).unwrap_or("unknown"),
                            elapsed = event.elapsed,
                            "Goal attributed"
                        );
                        if self.deliver(&format::goal(&fixture, &event), report).await {
                            report.goal_alerts += 1;
                        }
                    }
                    GoalAlert::Generic => {
                        if self.deliver(&format::goal_generic(&fixture), report).await {
                            report.generic_goal_alerts += 1;
                        }
                    }
                }
            }
        } else {
            state.set_score(fixture.id, fixture.score);
        }

        if self.config.corner_alerts
            && is_corner_cycle(state.meta.loop_count, self.config.corner_cadence)
        {
            let stats = self.fetch_statistics(fixture.id).await;
            match corner_alerts(state, &fixture, &stats) {
                Some(alerts) => {
                    for alert in alerts {
                        let text = format::corner(&fixture, alert.team_name(&fixture), alert.corners);
                        if self.deliver(&text, report).await {
                            report.corner_alerts += 1;
                        }
                    }
                }
                None => {
                    debug!(fixture_id = fixture.id, "Corner counts unavailable, skipping");
                }
            }
        }

        Ok(true)
    }

    // =========================================================================
    // Provider calls (degrade to empty)
    // =========================================================================

    async fn fetch_live_fixtures(&self) -> Vec<RawFixture> {
        match self.provider.live_fixtures(self.config.league_id).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                log_api_error(&e, "live fixtures");
                Vec::new()
            }
        }
    }

    async fn fetch_goal_events(&self, fixture_id: i64) -> Vec<GoalEvent> {
        let raw = match self.provider.events(fixture_id).await {
            Ok(raw) => raw,
            Err(e) => {
                log_api_error(&e, "fixture events");
                return Vec::new();
            }
        };

        raw.iter()
            .filter_map(|ev| match GoalEvent::from_raw(fixture_id, ev) {
                Ok(goal) => goal,
                Err(e) => {
                    warn!(fixture_id, error = %e, "Skipping malformed goal event");
                    None
                }
            })
            .collect()
    }

    async fn fetch_statistics(&self, fixture_id: i64) -> Vec<TeamStatistics> {
        let raw = match self.provider.statistics(fixture_id).await {
            Ok(raw) => raw,
            Err(e) => {
                log_api_error(&e, "fixture statistics");
                return Vec::new();
            }
        };

        raw.iter()
            .filter_map(|s| match TeamStatistics::try_from(s) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(fixture_id, error = %e, "Skipping malformed team statistics");
                    None
                }
            })
            .collect()
    }

    /// Best-effort delivery. Returns whether the sink accepted the message.
    async fn deliver(&self, text: &str, report: &mut CycleReport) -> bool {
        match self.notifier.send(text).await {
            Ok(()) => {
                debug!(notifier = self.notifier.name(), "Alert delivered");
                true
            }
            Err(e) => {
                warn!(notifier = self.notifier.name(), error = %e, "Alert delivery failed");
                report.delivery_failures += 1;
                false
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn log_api_error(e: &ApiError, what: &str) {
    match e {
        ApiError::MissingCredential(_) => error!(error = %e, call = what, "Upstream call skipped"),
        _ => warn!(
            error = %e,
            call = what,
            transient = e.is_retryable(),
            "Upstream call failed, treating as empty"
        ),
    }
}

fn log_fixtures(fixtures: &[RawFixture]) {
    info!(count = fixtures.len(), "Live fixtures");
    for raw in fixtures {
        let team = |t: Option<&crate::data::models::RawTeam>| {
            t.and_then(|t| t.name.clone()).unwrap_or_else(|| "?".to_string())
        };
        let teams = raw.teams.as_ref();
        info!(
            fixture_id = ?raw.fixture.as_ref().and_then(|f| f.id),
            league_id = ?raw.league.as_ref().and_then(|l| l.id),
            home = %team(teams.and_then(|t| t.home.as_ref())),
            away = %team(teams.and_then(|t| t.away.as_ref())),
            status = ?raw.fixture.as_ref().and_then(|f| f.status.as_ref()).and_then(|s| s.short.as_deref()),
            "Live fixture"
        );
    }
}
