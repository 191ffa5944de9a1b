//! Two-captain score agreement for a single match, and the administrator
//! override that bypasses it.
//!
//! Every function here is a pure transition: it checks the preconditions
//! against the match as read and returns the row to write. Persisting it
//! under a guard is left to [`crate::bracket::Bracket`].

use chrono::{DateTime, Utc};

use crate::captain::Captains;
use crate::error::{BracketError, Result};
use crate::models::{AdminClaim, Match, MatchStatus, Tournament};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub a: i32,
    pub b: i32,
}

impl Score {
    pub fn parse(a: i64, b: i64) -> Result<Score> {
        let valid = |score: i64| i32::try_from(score).ok().filter(|score| *score >= 0);
        match (valid(a), valid(b)) {
            (Some(score_a), Some(score_b)) => Ok(Score {
                a: score_a,
                b: score_b,
            }),
            _ => Err(BracketError::InvalidScore(a, b)),
        }
    }

    pub fn is_tie(&self) -> bool {
        self.a == self.b
    }

    pub fn require_winner(self) -> Result<Score> {
        if self.is_tie() {
            return Err(BracketError::TiedScoreNotAllowed(self.a));
        }
        Ok(self)
    }
}

fn expect_status(m: &Match, expected: MatchStatus) -> Result<()> {
    if m.status != expected {
        return Err(BracketError::WrongStatus {
            id: m.id,
            actual: m.status,
            expected,
        });
    }
    Ok(())
}

fn finalize(next: &mut Match, now: DateTime<Utc>) {
    next.status = MatchStatus::Completed;
    next.finalized_at = Some(now);
    next.winner = next.higher_scoring_team();
}

/// A captain records a score. The submitting side counts as confirmed and
/// the other side has to confirm again, whatever it confirmed before.
pub fn submit(
    m: &Match,
    captains: &Captains,
    actor: &str,
    score: Score,
    now: DateTime<Utc>,
) -> Result<Match> {
    if m.finalized_by_admin {
        return Err(BracketError::AlreadyFinalized(m.id));
    }
    let side = captains
        .side_of(actor)
        .ok_or_else(|| BracketError::NotCaptain(actor.to_string()))?;
    expect_status(m, MatchStatus::InPlay)?;
    if score.is_tie() {
        return Err(BracketError::InvalidScore(score.a.into(), score.b.into()));
    }

    let mut next = m.clone();
    next.score_a = Some(score.a);
    next.score_b = Some(score.b);
    next.submitted_by = Some(actor.to_string());
    next.submitted_at = Some(now);
    next.set_confirmed(side, true);
    next.set_confirmed(side.other(), false);
    next.admin_final_by = None;
    next.admin_final_at = None;
    Ok(next)
}

/// The captain of the side that did not submit accepts the score. Once both
/// sides agree the match completes with the higher score winning.
pub fn confirm(m: &Match, captains: &Captains, actor: &str, now: DateTime<Utc>) -> Result<Match> {
    if m.finalized_by_admin {
        return Err(BracketError::AlreadyFinalized(m.id));
    }
    let (Some(score_a), Some(score_b), Some(submitter)) =
        (m.score_a, m.score_b, m.submitted_by.as_deref())
    else {
        return Err(BracketError::NoScoreSubmitted(m.id));
    };
    let side = captains
        .side_of(actor)
        .ok_or_else(|| BracketError::NotCaptain(actor.to_string()))?;
    if actor == submitter || captains.side_of(submitter) == Some(side) {
        return Err(BracketError::SelfConfirmation);
    }
    if m.confirmed(side) {
        return Err(BracketError::AlreadyConfirmed(side));
    }
    expect_status(m, MatchStatus::InPlay)?;
    // Rows written before ties were rejected at submission.
    if score_a == score_b {
        return Err(BracketError::TiedSubmission(m.id));
    }

    let mut next = m.clone();
    next.set_confirmed(side, true);
    if next.confirmed_a && next.confirmed_b {
        finalize(&mut next, now);
    }
    Ok(next)
}

/// An administrator forces the result. This is the only way to finish a
/// match whose captains disagree or never answer.
pub fn admin_finalize(
    m: &Match,
    tournament: &Tournament,
    claim: &AdminClaim,
    score: Score,
    now: DateTime<Utc>,
) -> Result<Match> {
    let score = score.require_winner()?;
    if !claim.covers(tournament) {
        return Err(BracketError::NotAdmin {
            actor: claim.actor.clone(),
            tournament: tournament.id,
        });
    }
    if m.both_teams().is_none() {
        return Err(BracketError::TeamsUnset(m.id));
    }
    match m.status {
        MatchStatus::Completed => return Err(BracketError::AlreadyFinalized(m.id)),
        MatchStatus::Bye => {
            return Err(BracketError::WrongStatus {
                id: m.id,
                actual: m.status,
                expected: MatchStatus::InPlay,
            })
        }
        _ => {}
    }

    let mut next = m.clone();
    next.score_a = Some(score.a);
    next.score_b = Some(score.b);
    next.confirmed_a = true;
    next.confirmed_b = true;
    next.finalized_by_admin = true;
    next.admin_final_by = Some(claim.actor.clone());
    next.admin_final_at = Some(now);
    finalize(&mut next, now);
    Ok(next)
}

/// Operator action that opens a scheduled match for score reporting.
pub fn start(m: &Match, tournament: &Tournament, claim: &AdminClaim) -> Result<Match> {
    if !claim.covers(tournament) {
        return Err(BracketError::NotAdmin {
            actor: claim.actor.clone(),
            tournament: tournament.id,
        });
    }
    if m.both_teams().is_none() {
        return Err(BracketError::TeamsUnset(m.id));
    }
    expect_status(m, MatchStatus::Scheduled)?;
    let mut next = m.clone();
    next.status = MatchStatus::InPlay;
    Ok(next)
}
