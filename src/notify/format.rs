//! Alert message text.

use crate::data::models::{CornerCount, Fixture, GoalEvent, Score};

/// Fixed messages sent in simulate mode.
pub const SIMULATED_ALERTS: [&str; 2] = [
    "✅ TEST: GOAL! Arsenal 1–0 Chelsea (12')",
    "✅ TEST: CORNER! Arsenal 3–2 Chelsea (to Chelsea)",
];

/// Goal attributed to a specific event.
pub fn goal(fixture: &Fixture, event: &GoalEvent) -> String {
    let player = event.player_name.as_deref().unwrap_or("Unknown");
    let detail = event.detail.as_deref().unwrap_or("Goal");
    format!(
        "{}\nScorer: {} ({}) at {}",
        goal_generic(fixture),
        player,
        detail,
        minute(event)
    )
}

/// Goal known only from the scoreboard.
pub fn goal_generic(fixture: &Fixture) -> String {
    format!(
        "GOAL! {} {} {}",
        fixture.home.name,
        scoreline(&fixture.score),
        fixture.away.name
    )
}

/// Corner won by `team_name`, with the full corner count.
pub fn corner(fixture: &Fixture, team_name: &str, corners: CornerCount) -> String {
    let line = format!(
        "{} {}–{} {}",
        fixture.home.name, corners.home, corners.away, fixture.away.name
    );
    format!("CORNER! {line}\nCorner to {team_name}. Corners: {line}")
}

fn scoreline(score: &Score) -> String {
    format!("{}–{}", side(score.home), side(score.away))
}

fn side(goals: Option<u32>) -> String {
    goals.map(|g| g.to_string()).unwrap_or_else(|| "?".to_string())
}

fn minute(event: &GoalEvent) -> String {
    match event.extra {
        Some(extra) if extra > 0 => format!("{}'+{}", event.elapsed, extra),
        _ => format!("{}'", event.elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{FixtureStatus, Team};

    fn fixture(score: Score) -> Fixture {
        Fixture {
            id: 1,
            league_id: Some(39),
            status: FixtureStatus::FirstHalf,
            home: Team {
                id: 42,
                name: "Arsenal".to_string(),
            },
            away: Team {
                id: 49,
                name: "Chelsea".to_string(),
            },
            score,
        }
    }

    fn event(extra: Option<u32>) -> GoalEvent {
        GoalEvent {
            fixture_id: 1,
            team_id: 42,
            player_id: Some(10),
            player_name: Some("B. Saka".to_string()),
            elapsed: 45,
            extra,
            detail: Some("Normal Goal".to_string()),
        }
    }

    #[test]
    fn test_goal_message() {
        let text = goal(&fixture(Score::new(1, 0)), &event(None));
        assert_eq!(
            text,
            "GOAL! Arsenal 1–0 Chelsea\nScorer: B. Saka (Normal Goal) at 45'"
        );
    }

    #[test]
    fn test_goal_message_stoppage_time() {
        let text = goal(&fixture(Score::new(1, 0)), &event(Some(3)));
        assert!(text.ends_with("at 45'+3"));
    }

    #[test]
    fn test_goal_message_unknown_scorer() {
        let mut ev = event(None);
        ev.player_name = None;
        ev.detail = None;
        let text = goal(&fixture(Score::new(1, 0)), &ev);
        assert!(text.contains("Scorer: Unknown (Goal)"));
    }

    #[test]
    fn test_generic_goal_message() {
        assert_eq!(
            goal_generic(&fixture(Score::new(2, 2))),
            "GOAL! Arsenal 2–2 Chelsea"
        );
        assert_eq!(
            goal_generic(&fixture(Score::default())),
            "GOAL! Arsenal ?–? Chelsea"
        );
    }

    #[test]
    fn test_corner_message() {
        let text = corner(
            &fixture(Score::new(0, 0)),
            "Chelsea",
            CornerCount { home: 3, away: 2 },
        );
        assert_eq!(
            text,
            "CORNER! Arsenal 3–2 Chelsea\nCorner to Chelsea. Corners: Arsenal 3–2 Chelsea"
        );
    }
}
