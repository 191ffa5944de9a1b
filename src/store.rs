use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    Match, MatchId, MatchStatus, PlayerId, Side, SlotSource, Team, TeamId, TeamMembership,
    Tournament, TournamentId, TournamentStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The fields a match write is conditioned on. A write only lands when the
/// stored row still carries exactly these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGuard {
    pub status: MatchStatus,
    pub confirmed_a: bool,
    pub confirmed_b: bool,
    pub finalized_by_admin: bool,
    pub submitted_by: Option<PlayerId>,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub slot_a: SlotSource,
    pub slot_b: SlotSource,
    pub winner: Option<TeamId>,
}

impl MatchGuard {
    pub fn of(m: &Match) -> Self {
        Self {
            status: m.status,
            confirmed_a: m.confirmed_a,
            confirmed_b: m.confirmed_b,
            finalized_by_admin: m.finalized_by_admin,
            submitted_by: m.submitted_by.clone(),
            score_a: m.score_a,
            score_b: m.score_b,
            slot_a: m.slot_a,
            slot_b: m.slot_b,
            winner: m.winner,
        }
    }

    pub fn holds_for(&self, m: &Match) -> bool {
        *self == MatchGuard::of(m)
    }
}

#[async_trait]
pub trait BracketStore: Send + Sync {
    async fn get_match(&self, id: MatchId) -> Result<Option<Match>>;

    async fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>>;

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>>;

    async fn matches_in_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>>;

    async fn memberships_of(&self, teams: &[TeamId]) -> Result<Vec<TeamMembership>>;

    /// Writes `updated` over the stored match if `guard` still holds.
    /// Returns `None` when no row was affected.
    async fn update_match(&self, guard: &MatchGuard, updated: &Match) -> Result<Option<Match>>;

    /// Puts `winner` into one slot of match `id`, conditioned only on that
    /// slot still waiting on `upstream`. Writes to the other slot or to the
    /// score never make this fail. Returns `None` when the slot was already
    /// filled or the match is gone.
    async fn fill_slot(
        &self,
        id: MatchId,
        side: Side,
        upstream: MatchId,
        winner: TeamId,
    ) -> Result<Option<Match>>;

    /// Deletes those of `ids` that still carry no winner, no scores and no
    /// admin finalization. Returns the ids actually deleted.
    async fn delete_unplayed(&self, ids: &[MatchId]) -> Result<Vec<MatchId>>;

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> Result<bool>;
}

pub(crate) fn is_unplayed(m: &Match) -> bool {
    m.winner.is_none() && !m.finalized_by_admin && m.score_a.is_none() && m.score_b.is_none()
}
