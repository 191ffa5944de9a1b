use log::{debug, info, warn};

use crate::error::Result;
use crate::models::{Match, MatchId, MatchStatus, Side, TournamentId};
use crate::store::{BracketStore, MatchGuard};

/// What one propagation pass changed. Failed writes are reported as
/// warnings; the pass can simply be run again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Propagation {
    pub resolved: Vec<(MatchId, Side)>,
    pub promoted: Vec<MatchId>,
    pub warnings: Vec<String>,
}

/// Slots anywhere in `matches` still waiting on the result of `upstream`.
pub fn waiting_slots(upstream: MatchId, matches: &[Match]) -> Vec<(MatchId, Side)> {
    matches
        .iter()
        .filter(|m| m.id != upstream)
        .flat_map(|m| {
            Side::BOTH
                .into_iter()
                .filter(move |side| m.slot(*side).upstream() == Some(upstream))
                .map(move |side| (m.id, side))
        })
        .collect()
}

pub fn ready_to_schedule(m: &Match) -> bool {
    m.status == MatchStatus::Open && m.both_teams().is_some()
}

/// Pushes the winner of `completed` into every slot that depends on it, then
/// schedules every open match of the tournament that now has both teams.
/// Each slot is written on its own, so passes from two feeders of the same
/// match never block each other.
pub async fn propagate<S: BracketStore + ?Sized>(
    store: &S,
    completed: &Match,
) -> Result<Propagation> {
    let Some(winner) = completed.winner else {
        debug!("match {} has no winner, nothing to propagate", completed.id);
        return Ok(Propagation::default());
    };

    let mut propagation = Propagation::default();
    let matches = store.matches_in_tournament(completed.tournament).await?;
    for (id, side) in waiting_slots(completed.id, &matches) {
        match store.fill_slot(id, side, completed.id, winner).await {
            Ok(Some(_)) => {
                info!(
                    "match {} slot {} filled by team {} (winner of match {})",
                    id, side, winner, completed.id
                );
                propagation.resolved.push((id, side));
            }
            Ok(None) => debug!("match {id} slot {side} was already filled"),
            Err(err) => {
                let warning = format!("could not fill slot {side} of match {id}: {err:#}");
                warn!("{warning}");
                propagation.warnings.push(warning);
            }
        }
    }

    let (promoted, warnings) = schedule_seeded(store, completed.tournament).await?;
    propagation.promoted = promoted;
    propagation.warnings.extend(warnings);
    Ok(propagation)
}

/// Moves every open match with both teams known to scheduled. Safe to run
/// any number of times.
pub async fn schedule_seeded<S: BracketStore + ?Sized>(
    store: &S,
    tournament: TournamentId,
) -> Result<(Vec<MatchId>, Vec<String>)> {
    let mut promoted = Vec::new();
    let mut warnings = Vec::new();
    let matches = store.matches_in_tournament(tournament).await?;
    for m in matches.iter().filter(|m| ready_to_schedule(m)) {
        let mut next = m.clone();
        next.status = MatchStatus::Scheduled;
        match store.update_match(&MatchGuard::of(m), &next).await {
            Ok(Some(_)) => {
                info!("match {} scheduled", m.id);
                promoted.push(m.id);
            }
            Ok(None) => debug!("match {} changed before it could be scheduled", m.id),
            Err(err) => {
                let warning = format!("could not schedule match {}: {err:#}", m.id);
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }
    Ok((promoted, warnings))
}
