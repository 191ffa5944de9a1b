//! Decides whether a whole bracket is finished.

use serde::Serialize;

use crate::models::{Match, MatchStatus, SlotSource, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub completed: bool,
    pub final_round: Option<i32>,
}

/// A match with no real opponent in slot B. Legacy rows with neither a team
/// nor a source in slot B were normalized to an explicit bye when read.
pub fn is_bye(m: &Match) -> bool {
    m.status == MatchStatus::Bye || m.slot_b == SlotSource::Bye
}

pub fn is_playable(m: &Match) -> bool {
    m.bracket_round().is_some() && !is_bye(m)
}

pub fn is_done(m: &Match) -> bool {
    m.status == MatchStatus::Completed || m.finalized_by_admin || m.winner.is_some()
}

pub fn has_inferable_winner(m: &Match) -> bool {
    inferred_winner(m).is_some()
}

fn inferred_winner(m: &Match) -> Option<TeamId> {
    m.winner.or_else(|| m.higher_scoring_team())
}

pub fn derive(matches: &[Match]) -> Completion {
    let playable: Vec<&Match> = matches.iter().filter(|m| is_playable(m)).collect();
    let final_round = playable.iter().filter_map(|m| m.bracket_round()).max();
    let Some(round) = final_round else {
        return Completion {
            completed: false,
            final_round: None,
        };
    };
    if playable.iter().any(|m| !is_done(m)) {
        return Completion {
            completed: false,
            final_round,
        };
    }
    let completed = playable
        .iter()
        .filter(|m| m.bracket_round() == Some(round))
        .any(|m| has_inferable_winner(m));
    Completion {
        completed,
        final_round,
    }
}

/// The winner of the final round once the bracket is complete.
pub fn champion(matches: &[Match]) -> Option<TeamId> {
    let completion = derive(matches);
    if !completion.completed {
        return None;
    }
    matches
        .iter()
        .filter(|m| is_playable(m) && m.bracket_round() == completion.final_round)
        .find_map(inferred_winner)
}
