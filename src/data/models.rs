//! Data models for the live fixture feed.
//!
//! Two layers live here:
//! - `Raw*` records mirror the upstream JSON. Every field is optional or
//!   defaulted so a partial payload still deserializes.
//! - Validated domain types (`Fixture`, `GoalEvent`, `TeamStatistics`) that the
//!   alert logic works with. Conversion happens once, at the ingestion boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

// =============================================================================
// Upstream response envelope
// =============================================================================

/// Every endpoint wraps its payload in `{"response": [...]}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub response: Vec<T>,
    /// Upstream reports soft failures (bad key, plan limits) here with a 200.
    #[serde(default)]
    pub errors: serde_json::Value,
}

impl<T> Envelope<T> {
    /// Upstream error messages, if the envelope carries any.
    pub fn error_messages(&self) -> Vec<String> {
        match &self.errors {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| match v.as_str() {
                    Some(s) => format!("{k}: {s}"),
                    None => format!("{k}: {v}"),
                })
                .collect(),
            serde_json::Value::Array(items) => items.iter().map(|v| v.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Raw fixture records
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFixture {
    #[serde(default)]
    pub fixture: Option<RawFixtureInfo>,
    #[serde(default)]
    pub league: Option<RawLeague>,
    #[serde(default)]
    pub teams: Option<RawTeams>,
    #[serde(default)]
    pub goals: Option<RawGoals>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFixtureInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStatus {
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTeams {
    #[serde(default)]
    pub home: Option<RawTeam>,
    #[serde(default)]
    pub away: Option<RawTeam>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGoals {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

// =============================================================================
// Raw event records
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub time: Option<RawEventTime>,
    #[serde(default)]
    pub team: Option<RawTeam>,
    #[serde(default)]
    pub player: Option<RawPlayer>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEventTime {
    #[serde(default)]
    pub elapsed: Option<u32>,
    #[serde(default)]
    pub extra: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlayer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Raw statistics records
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTeamStatistics {
    #[serde(default)]
    pub team: Option<RawTeam>,
    #[serde(default)]
    pub statistics: Vec<RawStatistic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStatistic {
    #[serde(rename = "type", default)]
    pub stat_type: Option<String>,
    #[serde(default)]
    pub value: Option<StatValue>,
}

/// Statistic values come as integers, percentages ("54%"), or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

// =============================================================================
// Fixture status
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixtureStatus {
    NotStarted,
    ToBeDefined,
    Postponed,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    BreakTime,
    Penalties,
    Suspended,
    Interrupted,
    Live,
    Finished,
    FinishedAfterExtraTime,
    FinishedAfterPenalties,
    Cancelled,
    Abandoned,
    Other(String),
}

impl FixtureStatus {
    pub fn from_short(code: &str) -> Self {
        match code {
            "NS" => Self::NotStarted,
            "TBD" => Self::ToBeDefined,
            "PST" => Self::Postponed,
            "1H" => Self::FirstHalf,
            "HT" => Self::HalfTime,
            "2H" => Self::SecondHalf,
            "ET" => Self::ExtraTime,
            "BT" => Self::BreakTime,
            "P" => Self::Penalties,
            "SUSP" => Self::Suspended,
            "INT" => Self::Interrupted,
            "LIVE" => Self::Live,
            "FT" => Self::Finished,
            "AET" => Self::FinishedAfterExtraTime,
            "PEN" => Self::FinishedAfterPenalties,
            "CANC" => Self::Cancelled,
            "ABD" => Self::Abandoned,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn short(&self) -> &str {
        match self {
            Self::NotStarted => "NS",
            Self::ToBeDefined => "TBD",
            Self::Postponed => "PST",
            Self::FirstHalf => "1H",
            Self::HalfTime => "HT",
            Self::SecondHalf => "2H",
            Self::ExtraTime => "ET",
            Self::BreakTime => "BT",
            Self::Penalties => "P",
            Self::Suspended => "SUSP",
            Self::Interrupted => "INT",
            Self::Live => "LIVE",
            Self::Finished => "FT",
            Self::FinishedAfterExtraTime => "AET",
            Self::FinishedAfterPenalties => "PEN",
            Self::Cancelled => "CANC",
            Self::Abandoned => "ABD",
            Self::Other(code) => code,
        }
    }

    /// Whether alerts may still fire for a fixture in this status.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            Self::NotStarted
                | Self::ToBeDefined
                | Self::Postponed
                | Self::Finished
                | Self::FinishedAfterExtraTime
                | Self::FinishedAfterPenalties
                | Self::Cancelled
                | Self::Abandoned
        )
    }
}

impl fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

// =============================================================================
// Domain types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// A scoreline. Either side is `None` until kickoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self {
            home: Some(home),
            away: Some(away),
        }
    }
}

/// Per-team corner counts for one fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerCount {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: i64,
    pub league_id: Option<i64>,
    pub status: FixtureStatus,
    pub home: Team,
    pub away: Team,
    pub score: Score,
}

impl Fixture {
    /// Name for a team id if it plays in this fixture.
    pub fn team_name(&self, team_id: i64) -> Option<&str> {
        if team_id == self.home.id {
            Some(&self.home.name)
        } else if team_id == self.away.id {
            Some(&self.away.name)
        } else {
            None
        }
    }
}

impl TryFrom<RawFixture> for Fixture {
    type Error = ModelError;

    fn try_from(raw: RawFixture) -> Result<Self, Self::Error> {
        let info = raw.fixture.ok_or(ModelError::MissingField("fixture"))?;
        let id = info.id.ok_or(ModelError::MissingField("fixture.id"))?;
        let status = info
            .status
            .and_then(|s| s.short)
            .map(|s| FixtureStatus::from_short(&s))
            .ok_or(ModelError::MissingField("fixture.status.short"))?;

        let teams = raw.teams.ok_or(ModelError::MissingField("teams"))?;
        let home = team_from_raw(teams.home, "teams.home")?;
        let away = team_from_raw(teams.away, "teams.away")?;

        let score = raw
            .goals
            .map(|g| Score {
                home: g.home,
                away: g.away,
            })
            .unwrap_or_default();

        Ok(Self {
            id,
            league_id: raw.league.and_then(|l| l.id),
            status,
            home,
            away,
            score,
        })
    }
}

fn team_from_raw(raw: Option<RawTeam>, field: &'static str) -> Result<Team, ModelError> {
    let raw = raw.ok_or(ModelError::MissingField(field))?;
    let id = raw.id.ok_or(ModelError::MissingField(field))?;
    Ok(Team {
        id,
        name: raw.name.unwrap_or_else(|| format!("Team {id}")),
    })
}

// =============================================================================
// Goal events
// =============================================================================

const GOAL_EVENT_TYPE: &str = "Goal";
const MISSED_PENALTY_DETAIL: &str = "Missed Penalty";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEvent {
    pub fixture_id: i64,
    pub team_id: i64,
    pub player_id: Option<i64>,
    pub player_name: Option<String>,
    pub elapsed: u32,
    pub extra: Option<u32>,
    pub detail: Option<String>,
}

impl GoalEvent {
    pub fn key(&self) -> GoalKey {
        GoalKey {
            fixture_id: self.fixture_id,
            team_id: self.team_id,
            player_id: self.player_id,
            elapsed: self.elapsed,
            extra: self.extra,
            detail: self.detail.clone(),
        }
    }

    /// Convert a raw event. `Ok(None)` for events that are not goals.
    pub fn from_raw(fixture_id: i64, raw: &RawEvent) -> Result<Option<Self>, ModelError> {
        if raw.event_type.as_deref() != Some(GOAL_EVENT_TYPE) {
            return Ok(None);
        }
        // The feed files missed penalties under the goal type.
        if raw.detail.as_deref() == Some(MISSED_PENALTY_DETAIL) {
            return Ok(None);
        }

        let team_id = raw
            .team
            .as_ref()
            .and_then(|t| t.id)
            .ok_or(ModelError::MissingField("team.id"))?;
        let time = raw.time.as_ref().ok_or(ModelError::MissingField("time"))?;
        let elapsed = time.elapsed.ok_or(ModelError::MissingField("time.elapsed"))?;

        Ok(Some(Self {
            fixture_id,
            team_id,
            player_id: raw.player.as_ref().and_then(|p| p.id),
            player_name: raw.player.as_ref().and_then(|p| p.name.clone()),
            elapsed,
            extra: time.extra,
            detail: raw.detail.clone(),
        }))
    }
}

/// Identity of a goal event: two events are the same goal iff every
/// component matches. Persisted in its `Display` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalKey {
    pub fixture_id: i64,
    pub team_id: i64,
    pub player_id: Option<i64>,
    pub elapsed: u32,
    pub extra: Option<u32>,
    pub detail: Option<String>,
}

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.fixture_id,
            self.team_id,
            opt(&self.player_id),
            self.elapsed,
            opt(&self.extra),
            self.detail.as_deref().unwrap_or("None"),
        )
    }
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

// =============================================================================
// Team statistics
// =============================================================================

const CORNER_STAT_NAMES: [&str; 2] = ["corner kicks", "corners"];

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStatistics {
    pub team_id: i64,
    pub stats: Vec<(String, Option<StatValue>)>,
}

impl TryFrom<&RawTeamStatistics> for TeamStatistics {
    type Error = ModelError;

    fn try_from(raw: &RawTeamStatistics) -> Result<Self, Self::Error> {
        let team_id = raw
            .team
            .as_ref()
            .and_then(|t| t.id)
            .ok_or(ModelError::MissingField("team.id"))?;
        let stats = raw
            .statistics
            .iter()
            .filter_map(|s| s.stat_type.clone().map(|name| (name, s.value.clone())))
            .collect();
        Ok(Self { team_id, stats })
    }
}

impl TeamStatistics {
    /// Corner count for this team. A listed-but-null value counts as zero;
    /// `None` means the figure is absent or unreadable.
    pub fn corners(&self) -> Option<u32> {
        let (_, value) = self
            .stats
            .iter()
            .find(|(name, _)| CORNER_STAT_NAMES.contains(&name.to_lowercase().as_str()))?;

        match value {
            None => Some(0),
            Some(StatValue::Int(n)) => u32::try_from(*n).ok(),
            Some(StatValue::Float(f)) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u32),
            Some(StatValue::Float(_)) => None,
            Some(StatValue::Text(s)) => s.trim().parse().ok(),
        }
    }
}

/// Resolve both sides' corner counts. `None` unless both teams report one.
pub fn resolve_corners(fixture: &Fixture, stats: &[TeamStatistics]) -> Option<CornerCount> {
    let find = |team_id: i64| {
        stats
            .iter()
            .filter(|s| s.team_id == team_id)
            .find_map(|s| s.corners())
    };
    Some(CornerCount {
        home: find(fixture.home.id)?,
        away: find(fixture.away.id)?,
    })
}

// =============================================================================
// Tests
// =============================================================================
