use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{is_unplayed, BracketStore, MatchGuard};
use crate::models::{
    Match, MatchId, Side, Team, TeamId, TeamMembership, Tournament, TournamentId,
    TournamentStatus,
};

#[derive(Default)]
struct Tables {
    tournaments: BTreeMap<TournamentId, Tournament>,
    teams: BTreeMap<TeamId, Team>,
    members: Vec<TeamMembership>,
    matches: BTreeMap<MatchId, Match>,
}

/// Process-local store with the same conditional-write rules as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    pub fn insert_tournament(&self, tournament: Tournament) -> Result<()> {
        self.tables()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    pub fn insert_team(&self, team: Team) -> Result<()> {
        self.tables()?.teams.insert(team.id, team);
        Ok(())
    }

    pub fn add_member(&self, team: TeamId, player: &str) -> Result<bool> {
        let mut tables = self.tables()?;
        if tables
            .members
            .iter()
            .any(|m| m.team == team && m.player == player)
        {
            return Ok(false);
        }
        tables.members.push(TeamMembership::new(team, player));
        Ok(true)
    }

    pub fn remove_member(&self, team: TeamId, player: &str) -> Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.members.len();
        tables
            .members
            .retain(|m| !(m.team == team && m.player == player));
        Ok(tables.members.len() != before)
    }

    pub fn insert_match(&self, m: Match) -> Result<()> {
        self.tables()?.matches.insert(m.id, m);
        Ok(())
    }
}

#[async_trait]
impl BracketStore for MemoryStore {
    async fn get_match(&self, id: MatchId) -> Result<Option<Match>> {
        Ok(self.tables()?.matches.get(&id).cloned())
    }

    async fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
        Ok(self.tables()?.tournaments.get(&id).cloned())
    }

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>> {
        Ok(self.tables()?.teams.get(&id).cloned())
    }

    async fn matches_in_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>> {
        Ok(self
            .tables()?
            .matches
            .values()
            .filter(|m| m.tournament == tournament)
            .cloned()
            .collect())
    }

    async fn memberships_of(&self, teams: &[TeamId]) -> Result<Vec<TeamMembership>> {
        Ok(self
            .tables()?
            .members
            .iter()
            .filter(|m| teams.contains(&m.team))
            .cloned()
            .collect())
    }

    async fn update_match(&self, guard: &MatchGuard, updated: &Match) -> Result<Option<Match>> {
        let mut tables = self.tables()?;
        let Some(current) = tables.matches.get_mut(&updated.id) else {
            return Ok(None);
        };
        if !guard.holds_for(current) {
            return Ok(None);
        }
        *current = updated.clone();
        Ok(Some(updated.clone()))
    }

    async fn fill_slot(
        &self,
        id: MatchId,
        side: Side,
        upstream: MatchId,
        winner: TeamId,
    ) -> Result<Option<Match>> {
        let mut tables = self.tables()?;
        match tables.matches.get_mut(&id) {
            Some(current) if current.slot(side).upstream() == Some(upstream) => {
                current.resolve_slot(side, winner);
                Ok(Some(current.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_unplayed(&self, ids: &[MatchId]) -> Result<Vec<MatchId>> {
        let mut tables = self.tables()?;
        let mut deleted = Vec::new();
        for id in ids {
            if tables.matches.get(id).map_or(false, is_unplayed) {
                tables.matches.remove(id);
                deleted.push(*id);
            }
        }
        Ok(deleted)
    }

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> Result<bool> {
        let mut tables = self.tables()?;
        match tables.tournaments.get_mut(&id) {
            Some(tournament) if tournament.status == from => {
                tournament.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
