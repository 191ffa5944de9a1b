use chrono::Utc;
use log::{info, warn};

use crate::captain::{captain_of, Captains};
use crate::cleanup;
use crate::completion::{self, Completion};
use crate::consensus::{self, Score};
use crate::error::{BracketError, Result};
use crate::models::{
    AdminClaim, Match, MatchId, MatchStatus, PlayerId, Team, TeamId, Tournament, TournamentId,
    TournamentStatus,
};
use crate::propagation::{self, Propagation};
use crate::store::{BracketStore, MatchGuard};

/// Result of a tournament completion check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub completion: Completion,
    pub champion: Option<TeamId>,
    /// Phantom matches removed before the check.
    pub deleted: Vec<MatchId>,
    /// Whether this check is the one that closed the tournament.
    pub closed: bool,
    pub warnings: Vec<String>,
}

/// A committed match change plus whatever follow-up work it triggered.
/// Follow-up failures never undo the change; they are listed in `warnings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub updated: Match,
    pub propagation: Option<Propagation>,
    pub completion: Option<CompletionReport>,
    pub warnings: Vec<String>,
}

impl Outcome {
    fn committed(updated: Match) -> Self {
        Self {
            updated,
            propagation: None,
            completion: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub team: Team,
    pub captain: Option<PlayerId>,
    pub members: Vec<PlayerId>,
}

pub struct Bracket<S> {
    store: S,
}

impl<S: BracketStore> Bracket<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load_match(&self, id: MatchId) -> Result<Match> {
        self.store
            .get_match(id)
            .await?
            .ok_or(BracketError::MatchNotFound(id))
    }

    async fn load_tournament(&self, id: TournamentId) -> Result<Tournament> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or(BracketError::TournamentNotFound(id))
    }

    async fn commit(&self, current: &Match, next: &Match) -> Result<Match> {
        self.store
            .update_match(&MatchGuard::of(current), next)
            .await?
            .ok_or(BracketError::Conflict(current.id))
    }

    pub async fn submit_score(
        &self,
        match_id: MatchId,
        actor: &str,
        score_a: i64,
        score_b: i64,
    ) -> Result<Outcome> {
        let score = Score::parse(score_a, score_b)?;
        let current = self.load_match(match_id).await?;
        let captains = Captains::resolve(&self.store, &current).await?;
        let next = consensus::submit(&current, &captains, actor, score, Utc::now())?;
        let stored = self.commit(&current, &next).await?;
        info!(
            "match {} score {}-{} submitted by {}",
            stored.id, score.a, score.b, actor
        );
        Ok(Outcome::committed(stored))
    }

    pub async fn confirm_score(&self, match_id: MatchId, actor: &str) -> Result<Outcome> {
        let current = self.load_match(match_id).await?;
        let captains = Captains::resolve(&self.store, &current).await?;
        let next = consensus::confirm(&current, &captains, actor, Utc::now())?;
        let stored = self.commit(&current, &next).await?;
        info!("match {} score confirmed by {}", stored.id, actor);
        if stored.status == MatchStatus::Completed {
            return Ok(self.settle(stored).await);
        }
        Ok(Outcome::committed(stored))
    }

    pub async fn admin_finalize(
        &self,
        match_id: MatchId,
        claim: &AdminClaim,
        score_a: i64,
        score_b: i64,
    ) -> Result<Outcome> {
        let score = Score::parse(score_a, score_b)?.require_winner()?;
        let current = self.load_match(match_id).await?;
        let tournament = self.load_tournament(current.tournament).await?;
        let next = consensus::admin_finalize(&current, &tournament, claim, score, Utc::now())?;
        let stored = self.commit(&current, &next).await?;
        info!(
            "match {} finalized {}-{} by administrator {}",
            stored.id, score.a, score.b, claim.actor
        );
        Ok(self.settle(stored).await)
    }

    pub async fn start_match(&self, match_id: MatchId, claim: &AdminClaim) -> Result<Outcome> {
        let current = self.load_match(match_id).await?;
        let tournament = self.load_tournament(current.tournament).await?;
        let next = consensus::start(&current, &tournament, claim)?;
        let stored = self.commit(&current, &next).await?;
        info!("match {} started by {}", stored.id, claim.actor);
        Ok(Outcome::committed(stored))
    }

    /// Re-runs propagation from a decided match, e.g. after an earlier pass
    /// reported warnings. Slots that are already filled are left alone.
    pub async fn propagate_from(
        &self,
        match_id: MatchId,
        claim: &AdminClaim,
    ) -> Result<Propagation> {
        let completed = self.load_match(match_id).await?;
        let tournament = self.load_tournament(completed.tournament).await?;
        if !claim.covers(&tournament) {
            return Err(BracketError::NotAdmin {
                actor: claim.actor.clone(),
                tournament: tournament.id,
            });
        }
        if completed.winner.is_none() {
            return Err(BracketError::WrongStatus {
                id: completed.id,
                actual: completed.status,
                expected: MatchStatus::Completed,
            });
        }
        let propagation = propagation::propagate(&self.store, &completed).await?;
        info!(
            "propagation from match {} re-run by {}: {} slots filled, {} matches scheduled",
            match_id,
            claim.actor,
            propagation.resolved.len(),
            propagation.promoted.len()
        );
        Ok(propagation)
    }

    pub async fn check_completion(&self, tournament_id: TournamentId) -> Result<CompletionReport> {
        let tournament = self.load_tournament(tournament_id).await?;
        let mut warnings = Vec::new();
        let deleted = match cleanup::remove_phantoms(&self.store, tournament_id).await {
            Ok(deleted) => deleted,
            Err(err) => {
                let warning = format!("cleanup of tournament {tournament_id} failed: {err}");
                warn!("{warning}");
                warnings.push(warning);
                Vec::new()
            }
        };
        let matches = self.store.matches_in_tournament(tournament_id).await?;
        let completion = completion::derive(&matches);
        let champion = completion::champion(&matches);

        let mut closed = false;
        if completion.completed && tournament.status != TournamentStatus::Completed {
            closed = self
                .store
                .update_tournament_status(
                    tournament_id,
                    tournament.status,
                    TournamentStatus::Completed,
                )
                .await?;
            if closed {
                info!(
                    "tournament {} completed after round {:?}, champion {:?}",
                    tournament_id, completion.final_round, champion
                );
            }
        }
        Ok(CompletionReport {
            completion,
            champion,
            deleted,
            closed,
            warnings,
        })
    }

    /// Follow-up work after a match reaches a terminal state. The match is
    /// already committed, so nothing here may fail the operation.
    async fn settle(&self, completed: Match) -> Outcome {
        let mut outcome = Outcome::committed(completed);
        match propagation::propagate(&self.store, &outcome.updated).await {
            Ok(propagation) => {
                outcome.warnings.extend(propagation.warnings.iter().cloned());
                outcome.propagation = Some(propagation);
            }
            Err(err) => {
                let warning = format!(
                    "propagation from match {} failed: {err}",
                    outcome.updated.id
                );
                warn!("{warning}");
                outcome.warnings.push(warning);
            }
        }
        match self.check_completion(outcome.updated.tournament).await {
            Ok(report) => {
                outcome.warnings.extend(report.warnings.iter().cloned());
                outcome.completion = Some(report);
            }
            Err(err) => {
                let warning = format!(
                    "completion check for tournament {} failed: {err}",
                    outcome.updated.tournament
                );
                warn!("{warning}");
                outcome.warnings.push(warning);
            }
        }
        outcome
    }

    pub async fn roster(&self, team_id: TeamId) -> Result<Roster> {
        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or(BracketError::TeamNotFound(team_id))?;
        let memberships = self.store.memberships_of(&[team_id]).await?;
        let captain = captain_of(team_id, &memberships).ok();
        let mut members: Vec<PlayerId> = memberships.into_iter().map(|m| m.player).collect();
        members.sort();
        Ok(Roster {
            team,
            captain,
            members,
        })
    }

    pub async fn get_match(&self, match_id: MatchId) -> Result<Match> {
        self.load_match(match_id).await
    }
}
