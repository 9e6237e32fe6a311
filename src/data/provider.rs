//! Fixture data provider seam.
//!
//! The alert engine only consumes typed records; where they come from is
//! the provider's business. `FootballClient` is the production provider.

use async_trait::async_trait;

use crate::api::errors::ApiError;
use crate::data::models::{RawEvent, RawFixture, RawTeamStatistics};

/// Source of live fixture data for one poll cycle.
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Fixtures currently live in the given league.
    async fn live_fixtures(&self, league_id: i64) -> Result<Vec<RawFixture>, ApiError>;

    /// Play-by-play events recorded so far for a fixture.
    async fn events(&self, fixture_id: i64) -> Result<Vec<RawEvent>, ApiError>;

    /// Per-team statistics for a fixture.
    async fn statistics(&self, fixture_id: i64) -> Result<Vec<RawTeamStatistics>, ApiError>;
}
