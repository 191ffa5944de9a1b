use strum::IntoStaticStr;
use thiserror::Error;

use crate::models::{MatchId, MatchStatus, PlayerId, Side, TeamId, TournamentId};

/// Stable failure codes shown to users next to the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Unauthorized,
    WrongState,
    TiedScoreNotAllowed,
    CaptainsUnresolved,
    Storage,
}

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("match {0} does not exist")]
    MatchNotFound(MatchId),
    #[error("tournament {0} does not exist")]
    TournamentNotFound(TournamentId),
    #[error("team {0} does not exist")]
    TeamNotFound(TeamId),
    #[error("scores must be non-negative integers with a winner, got {0}-{1}")]
    InvalidScore(i64, i64),
    #[error("{0} is not a captain in this match")]
    NotCaptain(PlayerId),
    #[error("{actor} is not an administrator of tournament {tournament}")]
    NotAdmin {
        actor: PlayerId,
        tournament: TournamentId,
    },
    #[error("team {0} has no members to captain it")]
    NoCaptain(TeamId),
    #[error("captain of team {0} could not be resolved")]
    CaptainsUnresolved(TeamId),
    #[error("match {0} does not have both teams yet")]
    TeamsUnset(MatchId),
    #[error("match {id} is {actual}, expected {expected}")]
    WrongStatus {
        id: MatchId,
        actual: MatchStatus,
        expected: MatchStatus,
    },
    #[error("the submitting captain cannot confirm their own score")]
    SelfConfirmation,
    #[error("side {0} has already confirmed this score")]
    AlreadyConfirmed(Side),
    #[error("no score has been submitted for match {0}")]
    NoScoreSubmitted(MatchId),
    #[error("match {0} has already been finalized")]
    AlreadyFinalized(MatchId),
    #[error("match {0} holds a tied score, submit a new one")]
    TiedSubmission(MatchId),
    #[error("match {0} changed concurrently, reload and try again")]
    Conflict(MatchId),
    #[error("a winner is required, {0}-{0} is a tie")]
    TiedScoreNotAllowed(i32),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::MatchNotFound(_)
            | BracketError::TournamentNotFound(_)
            | BracketError::TeamNotFound(_) => ErrorKind::NotFound,
            BracketError::InvalidScore(..) => ErrorKind::InvalidInput,
            BracketError::NotCaptain(_)
            | BracketError::NotAdmin { .. }
            | BracketError::SelfConfirmation => ErrorKind::Unauthorized,
            BracketError::NoCaptain(_) | BracketError::CaptainsUnresolved(_) => {
                ErrorKind::CaptainsUnresolved
            }
            BracketError::TeamsUnset(_)
            | BracketError::WrongStatus { .. }
            | BracketError::AlreadyConfirmed(_)
            | BracketError::NoScoreSubmitted(_)
            | BracketError::AlreadyFinalized(_)
            | BracketError::TiedSubmission(_)
            | BracketError::Conflict(_) => ErrorKind::WrongState,
            BracketError::TiedScoreNotAllowed(_) => ErrorKind::TiedScoreNotAllowed,
            BracketError::Store(_) => ErrorKind::Storage,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().into()
    }
}

pub type Result<T, E = BracketError> = std::result::Result<T, E>;
