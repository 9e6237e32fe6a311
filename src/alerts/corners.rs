//! Corner-count tracking.

use crate::data::models::{resolve_corners, CornerCount, Fixture, TeamStatistics};
use crate::state::state_store::AlertState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    Home,
    Away,
}

/// One corner won by `side`, with both teams' counts after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerAlert {
    pub side: TeamSide,
    pub corners: CornerCount,
}

impl CornerAlert {
    pub fn team_name<'a>(&self, fixture: &'a Fixture) -> &'a str {
        match self.side {
            TeamSide::Home => &fixture.home.name,
            TeamSide::Away => &fixture.away.name,
        }
    }
}

/// Whether corner counts are checked on this cycle.
pub fn is_corner_cycle(loop_count: u64, cadence: u64) -> bool {
    loop_count % cadence.max(1) == 0
}

/// Compare resolved corner counts against the stored ones.
///
/// Returns `None` without touching state when either team's count is
/// unknown. Otherwise one alert per side that strictly increased, and the
/// stored counts are replaced by the observed ones, decreases included.
pub fn corner_alerts(
    state: &mut AlertState,
    fixture: &Fixture,
    stats: &[TeamStatistics],
) -> Option<Vec<CornerAlert>> {
    let current = resolve_corners(fixture, stats)?;
    let previous = state.corners(fixture.id).unwrap_or_default();

    let mut alerts = Vec::new();
    if current.home > previous.home {
        alerts.push(CornerAlert {
            side: TeamSide::Home,
            corners: current,
        });
    }
    if current.away > previous.away {
        alerts.push(CornerAlert {
            side: TeamSide::Away,
            corners: current,
        });
    }

    state.set_corners(fixture.id, current);
    Some(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{FixtureStatus, Score, StatValue, Team};

    fn fixture() -> Fixture {
        Fixture {
            id: 7,
            league_id: Some(39),
            status: FixtureStatus::FirstHalf,
            home: Team {
                id: 1,
                name: "Home".to_string(),
            },
            away: Team {
                id: 2,
                name: "Away".to_string(),
            },
            score: Score::new(0, 0),
        }
    }

    fn stats(home: u32, away: u32) -> Vec<TeamStatistics> {
        [(1, home), (2, away)]
            .into_iter()
            .map(|(team_id, corners)| TeamStatistics {
                team_id,
                stats: vec![(
                    "Corner Kicks".to_string(),
                    Some(StatValue::Int(corners as i64)),
                )],
            })
            .collect()
    }

    #[test]
    fn test_cadence() {
        assert!(is_corner_cycle(4, 2));
        assert!(!is_corner_cycle(3, 2));
        assert!(is_corner_cycle(3, 1));
        // Non-positive cadence is clamped to every cycle.
        assert!(is_corner_cycle(3, 0));
    }

    #[test]
    fn test_unseen_fixture_starts_from_zero() {
        let mut state = AlertState::default();
        let alerts = corner_alerts(&mut state, &fixture(), &stats(1, 0)).unwrap();
        assert_eq!(
            alerts,
            vec![CornerAlert {
                side: TeamSide::Home,
                corners: CornerCount { home: 1, away: 0 },
            }]
        );
        assert_eq!(state.corners(7), Some(CornerCount { home: 1, away: 0 }));
    }

    #[test]
    fn test_both_sides_increase() {
        let mut state = AlertState::default();
        state.set_corners(7, CornerCount { home: 2, away: 1 });
        let alerts = corner_alerts(&mut state, &fixture(), &stats(3, 2)).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].side, TeamSide::Home);
        assert_eq!(alerts[1].side, TeamSide::Away);
        assert!(alerts.iter().all(|a| a.corners == CornerCount { home: 3, away: 2 }));
        assert_eq!(alerts[1].team_name(&fixture()), "Away");
    }

    #[test]
    fn test_tie_or_decrease_never_fires() {
        let mut state = AlertState::default();
        state.set_corners(7, CornerCount { home: 5, away: 3 });
        let alerts = corner_alerts(&mut state, &fixture(), &stats(5, 2)).unwrap();
        assert!(alerts.is_empty());
        // Decrease is still written back.
        assert_eq!(state.corners(7), Some(CornerCount { home: 5, away: 2 }));
    }

    #[test]
    fn test_one_team_missing_leaves_state_alone() {
        let mut state = AlertState::default();
        state.set_corners(7, CornerCount { home: 1, away: 1 });
        let both = stats(4, 4);
        assert_eq!(corner_alerts(&mut state, &fixture(), &both[..1]), None);
        assert_eq!(state.corners(7), Some(CornerCount { home: 1, away: 1 }));
    }
}
