use std::str::FromStr;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{BracketStore, MatchGuard};
use crate::models::{
    Match, MatchId, MatchStatus, Side, SlotSource, Team, TeamId, TeamMembership, Tournament,
    TournamentId, TournamentScope, TournamentStatus,
};

const SLOT_TEAM: &str = "team";
const SLOT_WINNER_OF: &str = "winner_of";
const SLOT_BYE: &str = "bye";

#[derive(Debug, FromRow)]
struct TournamentRow {
    id: i32,
    name: String,
    status: String,
    scope: String,
    club: Option<i32>,
}

impl TryFrom<TournamentRow> for Tournament {
    type Error = anyhow::Error;

    fn try_from(row: TournamentRow) -> Result<Self> {
        Ok(Tournament {
            id: row.id,
            name: row.name,
            status: TournamentStatus::from_str(&row.status)
                .with_context(|| format!("tournament {}: bad status '{}'", row.id, row.status))?,
            scope: TournamentScope::from_str(&row.scope)
                .with_context(|| format!("tournament {}: bad scope '{}'", row.id, row.scope))?,
            club: row.club,
        })
    }
}

#[derive(Debug, FromRow)]
struct TeamRow {
    id: i32,
    tournament: i32,
    name: String,
}

#[derive(Debug, FromRow)]
struct MemberRow {
    team: i32,
    member: String,
}

#[derive(Debug, FromRow)]
struct MatchRow {
    id: i32,
    tournament: i32,
    round: Option<i32>,
    team_a: Option<i32>,
    team_b: Option<i32>,
    slot_a_kind: Option<String>,
    slot_a_ref: Option<i32>,
    slot_b_kind: Option<String>,
    slot_b_ref: Option<i32>,
    status: String,
    score_a: Option<i32>,
    score_b: Option<i32>,
    submitted_by: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    confirmed_a: bool,
    confirmed_b: bool,
    winner: Option<i32>,
    finalized_by_admin: bool,
    finalized_at: Option<DateTime<Utc>>,
    admin_final_by: Option<String>,
    admin_final_at: Option<DateTime<Utc>>,
}

fn slot_from_columns(kind: Option<&str>, reference: Option<i32>) -> Result<Option<SlotSource>> {
    let source = match (kind, reference) {
        (None, _) => return Ok(None),
        (Some(SLOT_BYE), _) => SlotSource::Bye,
        (Some(SLOT_TEAM), Some(team)) => SlotSource::Team(team),
        (Some(SLOT_WINNER_OF), Some(upstream)) => SlotSource::WinnerOfMatch(upstream),
        (Some(kind), reference) => bail!("bad slot source {kind}/{reference:?}"),
    };
    Ok(Some(source))
}

fn slot_columns(source: &SlotSource) -> (&'static str, Option<i32>) {
    match source {
        SlotSource::Team(team) => (SLOT_TEAM, Some(*team)),
        SlotSource::WinnerOfMatch(upstream) => (SLOT_WINNER_OF, Some(*upstream)),
        SlotSource::Bye => (SLOT_BYE, None),
    }
}

impl TryFrom<MatchRow> for Match {
    type Error = anyhow::Error;

    fn try_from(row: MatchRow) -> Result<Self> {
        let slot_a = slot_from_columns(row.slot_a_kind.as_deref(), row.slot_a_ref)
            .with_context(|| format!("match {} slot A", row.id))?;
        let slot_b = slot_from_columns(row.slot_b_kind.as_deref(), row.slot_b_ref)
            .with_context(|| format!("match {} slot B", row.id))?;
        Ok(Match {
            id: row.id,
            tournament: row.tournament,
            round: row.round,
            team_a: row.team_a,
            team_b: row.team_b,
            slot_a: SlotSource::normalize(slot_a, row.team_a),
            slot_b: SlotSource::normalize(slot_b, row.team_b),
            status: MatchStatus::from_str(&row.status)
                .with_context(|| format!("match {}: bad status '{}'", row.id, row.status))?,
            score_a: row.score_a,
            score_b: row.score_b,
            submitted_by: row.submitted_by,
            submitted_at: row.submitted_at,
            confirmed_a: row.confirmed_a,
            confirmed_b: row.confirmed_b,
            winner: row.winner,
            finalized_by_admin: row.finalized_by_admin,
            finalized_at: row.finalized_at,
            admin_final_by: row.admin_final_by,
            admin_final_at: row.admin_final_at,
        })
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl BracketStore for PgStore {
    async fn get_match(&self, id: MatchId) -> Result<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
        let row = sqlx::query_as::<_, TournamentRow>("SELECT * FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tournament::try_from).transpose()
    }

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Team {
            id: row.id,
            tournament: row.tournament,
            name: row.name,
        }))
    }

    async fn matches_in_tournament(&self, tournament: TournamentId) -> Result<Vec<Match>> {
        sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE tournament = $1 ORDER BY round NULLS LAST, id",
        )
        .bind(tournament)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Match::try_from)
        .collect()
    }

    async fn memberships_of(&self, teams: &[TeamId]) -> Result<Vec<TeamMembership>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT team, member FROM team_members WHERE team = ANY($1)",
        )
        .bind(teams.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| TeamMembership::new(row.team, row.member))
            .collect())
    }

    async fn update_match(&self, guard: &MatchGuard, updated: &Match) -> Result<Option<Match>> {
        let (slot_a_kind, slot_a_ref) = slot_columns(&updated.slot_a);
        let (slot_b_kind, slot_b_ref) = slot_columns(&updated.slot_b);
        let (guard_a_kind, guard_a_ref) = slot_columns(&guard.slot_a);
        let (guard_b_kind, guard_b_ref) = slot_columns(&guard.slot_b);
        let row = sqlx::query_as::<_, MatchRow>(
            "UPDATE matches SET
                    team_a = $2, team_b = $3,
                    slot_a_kind = $4, slot_a_ref = $5, slot_b_kind = $6, slot_b_ref = $7,
                    status = $8, score_a = $9, score_b = $10,
                    submitted_by = $11, submitted_at = $12,
                    confirmed_a = $13, confirmed_b = $14, winner = $15,
                    finalized_by_admin = $16, finalized_at = $17,
                    admin_final_by = $18, admin_final_at = $19
                 WHERE id = $1
                    AND status = $20
                    AND confirmed_a = $21
                    AND confirmed_b = $22
                    AND finalized_by_admin = $23
                    AND submitted_by IS NOT DISTINCT FROM $24
                    AND score_a IS NOT DISTINCT FROM $25
                    AND score_b IS NOT DISTINCT FROM $26
                    AND slot_a_kind = $27 AND slot_a_ref IS NOT DISTINCT FROM $28
                    AND slot_b_kind = $29 AND slot_b_ref IS NOT DISTINCT FROM $30
                    AND winner IS NOT DISTINCT FROM $31
                 RETURNING *",
        )
        .bind(updated.id)
        .bind(updated.team_a)
        .bind(updated.team_b)
        .bind(slot_a_kind)
        .bind(slot_a_ref)
        .bind(slot_b_kind)
        .bind(slot_b_ref)
        .bind(updated.status.as_ref())
        .bind(updated.score_a)
        .bind(updated.score_b)
        .bind(updated.submitted_by.as_deref())
        .bind(updated.submitted_at)
        .bind(updated.confirmed_a)
        .bind(updated.confirmed_b)
        .bind(updated.winner)
        .bind(updated.finalized_by_admin)
        .bind(updated.finalized_at)
        .bind(updated.admin_final_by.as_deref())
        .bind(updated.admin_final_at)
        .bind(guard.status.as_ref())
        .bind(guard.confirmed_a)
        .bind(guard.confirmed_b)
        .bind(guard.finalized_by_admin)
        .bind(guard.submitted_by.as_deref())
        .bind(guard.score_a)
        .bind(guard.score_b)
        .bind(guard_a_kind)
        .bind(guard_a_ref)
        .bind(guard_b_kind)
        .bind(guard_b_ref)
        .bind(guard.winner)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Match::try_from).transpose()
    }

    async fn fill_slot(
        &self,
        id: MatchId,
        side: Side,
        upstream: MatchId,
        winner: TeamId,
    ) -> Result<Option<Match>> {
        let query = match side {
            Side::A => {
                "UPDATE matches SET team_a = $2, slot_a_kind = $3, slot_a_ref = $2
                     WHERE id = $1 AND slot_a_kind = $4 AND slot_a_ref = $5
                     RETURNING *"
            }
            Side::B => {
                "UPDATE matches SET team_b = $2, slot_b_kind = $3, slot_b_ref = $2
                     WHERE id = $1 AND slot_b_kind = $4 AND slot_b_ref = $5
                     RETURNING *"
            }
        };
        let row = sqlx::query_as::<_, MatchRow>(query)
            .bind(id)
            .bind(winner)
            .bind(SLOT_TEAM)
            .bind(SLOT_WINNER_OF)
            .bind(upstream)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn delete_unplayed(&self, ids: &[MatchId]) -> Result<Vec<MatchId>> {
        Ok(sqlx::query_scalar::<_, i32>(
            "DELETE FROM matches
                 WHERE id = ANY($1)
                    AND winner IS NULL
                    AND finalized_by_admin IS FALSE
                    AND score_a IS NULL
                    AND score_b IS NULL
                 RETURNING id",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE tournaments SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.as_ref())
            .bind(id)
            .bind(from.as_ref())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
