use log::{debug, info};

use crate::error::Result;
use crate::models::{Match, MatchId, Side, TournamentId};
use crate::store::{is_unplayed, BracketStore};

/// Highest round in which some match has both teams.
pub fn max_full_round(matches: &[Match]) -> Option<i32> {
    matches
        .iter()
        .filter(|m| m.both_teams().is_some())
        .filter_map(Match::bracket_round)
        .max()
}

/// A slot still fed by an upstream match. Such a match belongs to the live
/// bracket even while it is missing a team.
fn awaits_winner(m: &Match) -> bool {
    Side::BOTH
        .into_iter()
        .any(|side| m.slot(side).upstream().is_some())
}

/// Matches left behind by bracket generation beyond the last round that ever
/// got a full pairing. Anything carrying a result is kept.
pub fn phantom_matches(matches: &[Match]) -> Vec<MatchId> {
    let Some(max_round) = max_full_round(matches) else {
        return Vec::new();
    };
    matches
        .iter()
        .filter(|m| m.bracket_round().map_or(false, |round| round > max_round))
        .filter(|m| is_unplayed(m) && m.both_teams().is_none() && !awaits_winner(m))
        .map(|m| m.id)
        .collect()
}

pub async fn remove_phantoms<S: BracketStore + ?Sized>(
    store: &S,
    tournament: TournamentId,
) -> Result<Vec<MatchId>> {
    let matches = store.matches_in_tournament(tournament).await?;
    let phantoms = phantom_matches(&matches);
    if phantoms.is_empty() {
        debug!("tournament {tournament} has no phantom matches");
        return Ok(phantoms);
    }
    let deleted = store.delete_unplayed(&phantoms).await?;
    for id in &deleted {
        info!("deleted phantom match {id} from tournament {tournament}");
    }
    Ok(deleted)
}
