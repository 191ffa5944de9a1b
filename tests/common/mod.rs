#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use bracket_matchbot::models::{
    Match, MatchId, MatchStatus, Side, SlotSource, Team, TeamId, TeamMembership, Tournament,
    TournamentId, TournamentScope, TournamentStatus,
};
use bracket_matchbot::store::{BracketStore, MatchGuard, MemoryStore};

pub const CUP: i32 = 1;
pub const SEMI: i32 = 1;
pub const OTHER_SEMI: i32 = 2;
pub const FINAL: i32 = 3;
pub const PHANTOM: i32 = 4;
pub const SCORED_PHANTOM: i32 = 5;

fn team(id: i32) -> Team {
    Team {
        id,
        tournament: CUP,
        name: format!("Team {id}"),
    }
}

/// Four teams, two semifinals in play feeding the final. Round 3 holds
/// leftovers from bracket generation.
pub fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_tournament(Tournament {
            id: CUP,
            name: "Winter Cup".to_string(),
            status: TournamentStatus::InProgress,
            scope: TournamentScope::Club,
            club: Some(7),
        })
        .unwrap();
    for id in 1..=4 {
        store.insert_team(team(id)).unwrap();
    }
    for (team, player) in [(1, "p1"), (1, "p9"), (2, "p2"), (2, "p8"), (3, "p3"), (4, "p4")] {
        store.add_member(team, player).unwrap();
    }

    store
        .insert_match(
            Match::new(SEMI, CUP, Some(1), SlotSource::Team(1), SlotSource::Team(2))
                .with_status(MatchStatus::InPlay),
        )
        .unwrap();
    store
        .insert_match(
            Match::new(OTHER_SEMI, CUP, Some(1), SlotSource::Team(3), SlotSource::Team(4))
                .with_status(MatchStatus::InPlay),
        )
        .unwrap();
    store
        .insert_match(Match::new(
            FINAL,
            CUP,
            Some(2),
            SlotSource::WinnerOfMatch(SEMI),
            SlotSource::WinnerOfMatch(OTHER_SEMI),
        ))
        .unwrap();
    store
        .insert_match(Match::new(PHANTOM, CUP, Some(3), SlotSource::Team(1), SlotSource::Bye))
        .unwrap();
    let mut scored =
        Match::new(SCORED_PHANTOM, CUP, Some(3), SlotSource::Team(3), SlotSource::Bye);
    scored.score_a = Some(1);
    store.insert_match(scored).unwrap();
    store
}

/// Wraps a `MemoryStore` and lets another writer land on a match right
/// before the next write to it goes through.
pub struct Interleaved {
    pub inner: MemoryStore,
    pending: Mutex<Option<Match>>,
}

impl Interleaved {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }

    /// `row` is stored just before the next write that targets its id.
    pub fn before_next_write(&self, row: Match) {
        *self.pending.lock().unwrap() = Some(row);
    }

    fn interfere(&self, id: MatchId) {
        let mut pending = self.pending.lock().unwrap();
        if pending.as_ref().map_or(false, |row| row.id == id) {
            if let Some(row) = pending.take() {
                self.inner.insert_match(row).unwrap();
            }
        }
    }
}

#[async_trait]
impl BracketStore for Interleaved {
    async fn get_match(&self, id: MatchId) -> Result<Option<Match>> {
        self.inner.get_match(id).await
    }

    async fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
        self.inner.get_tournament(id).await
    }

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>> {
        self.inner.get_team(id).await
    }

    async fn matches_in_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>> {
        self.inner.matches_in_tournament(tournament).await
    }

    async fn memberships_of(&self, teams: &[TeamId]) -> Result<Vec<TeamMembership>> {
        self.inner.memberships_of(teams).await
    }

    async fn update_match(&self, guard: &MatchGuard, updated: &Match) -> Result<Option<Match>> {
        self.interfere(updated.id);
        self.inner.update_match(guard, updated).await
    }

    async fn fill_slot(
        &self,
        id: MatchId,
        side: Side,
        upstream: MatchId,
        winner: TeamId,
    ) -> Result<Option<Match>> {
        self.interfere(id);
        self.inner.fill_slot(id, side, upstream, winner).await
    }

    async fn delete_unplayed(&self, ids: &[MatchId]) -> Result<Vec<MatchId>> {
        self.inner.delete_unplayed(ids).await
    }

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> Result<bool> {
        self.inner.update_tournament_status(id, from, to).await
    }
}
