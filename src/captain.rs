use crate::error::{BracketError, Result};
use crate::models::{Match, PlayerId, Side, TeamId, TeamMembership};
use crate::store::BracketStore;

/// The captain of a team is the member with the smallest player id. It needs
/// no stored flag and does not depend on the order memberships come back in.
pub fn captain_of(team: TeamId, memberships: &[TeamMembership]) -> Result<PlayerId> {
    memberships
        .iter()
        .filter(|membership| membership.team == team)
        .map(|membership| &membership.player)
        .min()
        .cloned()
        .ok_or(BracketError::NoCaptain(team))
}

/// Resolved captains of both sides of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captains {
    pub a: PlayerId,
    pub b: PlayerId,
}

impl Captains {
    pub fn from_memberships(m: &Match, memberships: &[TeamMembership]) -> Result<Captains> {
        let (team_a, team_b) = m.both_teams().ok_or(BracketError::TeamsUnset(m.id))?;
        let a = captain_of(team_a, memberships)
            .map_err(|_| BracketError::CaptainsUnresolved(team_a))?;
        let b = captain_of(team_b, memberships)
            .map_err(|_| BracketError::CaptainsUnresolved(team_b))?;
        Ok(Captains { a, b })
    }

    pub async fn resolve<S: BracketStore + ?Sized>(store: &S, m: &Match) -> Result<Captains> {
        let (team_a, team_b) = m.both_teams().ok_or(BracketError::TeamsUnset(m.id))?;
        let memberships = store.memberships_of(&[team_a, team_b]).await?;
        Captains::from_memberships(m, &memberships)
    }

    pub fn of(&self, side: Side) -> &str {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// The side `player` captains. Side A wins if one player captains both.
    pub fn side_of(&self, player: &str) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.of(*side) == player)
    }
}
