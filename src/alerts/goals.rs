//! Goal detection.
//!
//! Two signals feed goal alerts:
//! - the scoreboard (`Fixture::score`), which is quick but anonymous
//! - the play-by-play feed (`GoalEvent`), which names the scorer but can lag
//!
//! A scoreline change always produces exactly one alert: the first unseen goal
//! event if one exists, a generic scoreline alert otherwise. A sweep then
//! alerts any remaining unseen goal events. Keys are recorded at the moment
//! an alert is decided, so a key can never be alerted twice.

use tracing::debug;

use crate::data::models::{Fixture, GoalEvent, Score};
use crate::state::state_store::AlertState;

/// Scoreline moved since the last observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub previous: Score,
    pub current: Score,
}

/// A goal alert to deliver, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalAlert {
    /// Attributed to a specific event.
    Detailed(GoalEvent),
    /// Scoreboard moved but no unseen event could be matched.
    Generic,
}

/// Compare against the stored scoreline. An unseen fixture defaults to its
/// own current score, so a first sighting never counts as a change. A stored
/// scoreline with a null side predates kickoff and is not compared either.
pub fn detect_score_change(previous: Option<Score>, current: Score) -> Option<ScoreChange> {
    let previous = previous.unwrap_or(current);
    if previous.home.is_none() || previous.away.is_none() {
        return None;
    }
    (previous != current).then_some(ScoreChange { previous, current })
}

/// Claim the first unseen goal event, recording its key.
pub fn claim_unseen(state: &mut AlertState, events: &[GoalEvent]) -> Option<GoalEvent> {
    events
        .iter()
        .find(|ev| state.mark_seen(&ev.key()))
        .cloned()
}

/// Claim every remaining unseen goal event, recording their keys.
pub fn sweep_unseen(state: &mut AlertState, events: &[GoalEvent]) -> Vec<GoalEvent> {
    events
        .iter()
        .filter(|ev| state.mark_seen(&ev.key()))
        .cloned()
        .collect()
}

/// Decide this cycle's goal alerts for one fixture and update state.
///
/// The stored scoreline is overwritten with the current one whether or not
/// the change could be attributed.
pub fn goal_alerts(state: &mut AlertState, fixture: &Fixture, events: &[GoalEvent]) -> Vec<GoalAlert> {
    let mut alerts = Vec::new();

    if let Some(change) = detect_score_change(state.score(fixture.id), fixture.score) {
        debug!(
            fixture_id = fixture.id,
            previous = ?change.previous,
            current = ?change.current,
            "Score changed"
        );
        match claim_unseen(state, events) {
            Some(event) => alerts.push(GoalAlert::Detailed(event)),
            None => alerts.push(GoalAlert::Generic),
        }
    }
    state.set_score(fixture.id, fixture.score);

    alerts.extend(sweep_unseen(state, events).into_iter().map(GoalAlert::Detailed));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{FixtureStatus, Team};

    fn fixture(score: Score) -> Fixture {
        Fixture {
            id: 100,
            league_id: Some(39),
            status: FixtureStatus::SecondHalf,
            home: Team {
                id: 1,
                name: "Home".to_string(),
            },
            away: Team {
                id: 2,
                name: "Away".to_string(),
            },
            score,
        }
    }

    fn goal(team_id: i64, elapsed: u32) -> GoalEvent {
        GoalEvent {
            fixture_id: 100,
            team_id,
            player_id: Some(elapsed as i64),
            player_name: Some(format!("Player {elapsed}")),
            elapsed,
            extra: None,
            detail: Some("Normal Goal".to_string()),
        }
    }

    #[test]
    fn test_first_sighting_is_not_a_change() {
        assert_eq!(detect_score_change(None, Score::new(2, 0)), None);
        assert_eq!(
            detect_score_change(Some(Score::new(0, 0)), Score::new(0, 0)),
            None
        );
        assert_eq!(
            detect_score_change(Some(Score::new(0, 0)), Score::new(1, 0)),
            Some(ScoreChange {
                previous: Score::new(0, 0),
                current: Score::new(1, 0),
            })
        );
    }

    #[test]
    fn test_kickoff_from_null_score_is_not_a_goal() {
        assert_eq!(detect_score_change(Some(Score::default()), Score::new(0, 0)), None);

        let mut state = AlertState::default();
        state.set_score(100, Score::default());
        let alerts = goal_alerts(&mut state, &fixture(Score::new(0, 0)), &[]);
        assert!(alerts.is_empty());
        assert_eq!(state.score(100), Some(Score::new(0, 0)));
    }

    #[test]
    fn test_goal_after_null_score_still_reported_by_sweep() {
        let mut state = AlertState::default();
        state.set_score(100, Score::default());
        let alerts = goal_alerts(&mut state, &fixture(Score::new(1, 0)), &[goal(1, 3)]);
        assert_eq!(alerts, vec![GoalAlert::Detailed(goal(1, 3))]);
    }

    #[test]
    fn test_first_sighting_sweeps_existing_goal() {
        let mut state = AlertState::default();
        let fx = fixture(Score::new(1, 0));
        let alerts = goal_alerts(&mut state, &fx, &[goal(1, 12)]);

        assert_eq!(alerts, vec![GoalAlert::Detailed(goal(1, 12))]);
        assert_eq!(state.seen_goals.len(), 1);
        assert_eq!(state.score(100), Some(Score::new(1, 0)));
    }

    #[test]
    fn test_score_change_prefers_detailed_alert() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(0, 0));
        let fx = fixture(Score::new(1, 0));

        let alerts = goal_alerts(&mut state, &fx, &[goal(1, 12)]);
        assert_eq!(alerts, vec![GoalAlert::Detailed(goal(1, 12))]);
    }

    #[test]
    fn test_score_change_without_event_is_generic() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(0, 0));
        let fx = fixture(Score::new(0, 1));

        let alerts = goal_alerts(&mut state, &fx, &[]);
        assert_eq!(alerts, vec![GoalAlert::Generic]);
        assert_eq!(state.score(100), Some(Score::new(0, 1)));
        assert!(state.seen_goals.is_empty());
    }

    #[test]
    fn test_score_change_with_only_seen_events_is_generic() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(1, 0));
        state.mark_seen(&goal(1, 12).key());
        let fx = fixture(Score::new(2, 0));

        let alerts = goal_alerts(&mut state, &fx, &[goal(1, 12)]);
        assert_eq!(alerts, vec![GoalAlert::Generic]);
    }

    #[test]
    fn test_two_goals_between_polls() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(0, 0));
        let fx = fixture(Score::new(1, 1));
        let events = [goal(1, 10), goal(2, 14)];

        let alerts = goal_alerts(&mut state, &fx, &events);
        assert_eq!(
            alerts,
            vec![
                GoalAlert::Detailed(goal(1, 10)),
                GoalAlert::Detailed(goal(2, 14)),
            ]
        );
        assert_eq!(state.seen_goals.len(), 2);
    }

    #[test]
    fn test_duplicate_events_in_feed_alert_once() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(0, 0));
        let fx = fixture(Score::new(1, 0));

        let alerts = goal_alerts(&mut state, &fx, &[goal(1, 10), goal(1, 10)]);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_rerun_is_silent() {
        let mut state = AlertState::default();
        let fx = fixture(Score::new(1, 0));
        let events = [goal(1, 12)];

        assert_eq!(goal_alerts(&mut state, &fx, &events).len(), 1);
        assert!(goal_alerts(&mut state, &fx, &events).is_empty());
    }

    #[test]
    fn test_event_ahead_of_scoreboard() {
        let mut state = AlertState::default();
        state.set_score(100, Score::new(0, 0));
        let fx = fixture(Score::new(0, 0));

        let alerts = goal_alerts(&mut state, &fx, &[goal(2, 50)]);
        assert_eq!(alerts, vec![GoalAlert::Detailed(goal(2, 50))]);

        // Scoreboard catches up next cycle; the event is already claimed.
        let fx = fixture(Score::new(0, 1));
        let alerts = goal_alerts(&mut state, &fx, &[goal(2, 50)]);
        assert_eq!(alerts, vec![GoalAlert::Generic]);
    }
}
