use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub type MatchId = i32;
pub type TeamId = i32;
pub type TournamentId = i32;
pub type ClubId = i32;
pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament: TournamentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team: TeamId,
    pub player: PlayerId,
}

impl TeamMembership {
    pub fn new(team: TeamId, player: impl Into<PlayerId>) -> Self {
        Self {
            team,
            player: player.into(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Open,
    Scheduled,
    InPlay,
    Completed,
    Bye,
}

/// Where a competitor slot gets its team from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSource {
    Team(TeamId),
    WinnerOfMatch(MatchId),
    Bye,
}

impl SlotSource {
    /// Rows written before slot sources were recorded carry no source at all.
    /// A missing source with a team means the slot was seeded directly, a
    /// missing source without a team is an implicit bye.
    pub fn normalize(raw: Option<SlotSource>, team: Option<TeamId>) -> SlotSource {
        match (raw, team) {
            (Some(source), _) => source,
            (None, Some(team)) => SlotSource::Team(team),
            (None, None) => SlotSource::Bye,
        }
    }

    pub fn upstream(&self) -> Option<MatchId> {
        match self {
            SlotSource::WinnerOfMatch(id) => Some(*id),
            _ => None,
        }
    }

    pub fn team(&self) -> Option<TeamId> {
        match self {
            SlotSource::Team(team) => Some(*team),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament: TournamentId,
    pub round: Option<i32>,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub slot_a: SlotSource,
    pub slot_b: SlotSource,
    pub status: MatchStatus,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub submitted_by: Option<PlayerId>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub confirmed_a: bool,
    pub confirmed_b: bool,
    pub winner: Option<TeamId>,
    pub finalized_by_admin: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub admin_final_by: Option<PlayerId>,
    pub admin_final_at: Option<DateTime<Utc>>,
}

impl Match {
    /// An open match whose slots are fed by `slot_a` and `slot_b`.
    pub fn new(
        id: MatchId,
        tournament: TournamentId,
        round: Option<i32>,
        slot_a: SlotSource,
        slot_b: SlotSource,
    ) -> Self {
        Self {
            id,
            tournament,
            round,
            team_a: slot_a.team(),
            team_b: slot_b.team(),
            slot_a,
            slot_b,
            status: MatchStatus::Open,
            score_a: None,
            score_b: None,
            submitted_by: None,
            submitted_at: None,
            confirmed_a: false,
            confirmed_b: false,
            winner: None,
            finalized_by_admin: false,
            finalized_at: None,
            admin_final_by: None,
            admin_final_at: None,
        }
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    /// The round this match counts in, if it takes part in progression at all.
    pub fn bracket_round(&self) -> Option<i32> {
        self.round.filter(|round| *round > 0)
    }

    pub fn team(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::A => self.team_a,
            Side::B => self.team_b,
        }
    }

    pub fn slot(&self, side: Side) -> SlotSource {
        match side {
            Side::A => self.slot_a,
            Side::B => self.slot_b,
        }
    }

    pub fn score(&self, side: Side) -> Option<i32> {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn confirmed(&self, side: Side) -> bool {
        match side {
            Side::A => self.confirmed_a,
            Side::B => self.confirmed_b,
        }
    }

    pub fn set_confirmed(&mut self, side: Side, confirmed: bool) {
        match side {
            Side::A => self.confirmed_a = confirmed,
            Side::B => self.confirmed_b = confirmed,
        }
    }

    pub fn both_teams(&self) -> Option<(TeamId, TeamId)> {
        Some((self.team_a?, self.team_b?))
    }

    /// Fills a slot with the winner of its upstream match. The slot stops
    /// pointing at the upstream match once it holds a team.
    pub fn resolve_slot(&mut self, side: Side, winner: TeamId) {
        match side {
            Side::A => {
                self.team_a = Some(winner);
                self.slot_a = SlotSource::Team(winner);
            }
            Side::B => {
                self.team_b = Some(winner);
                self.slot_b = SlotSource::Team(winner);
            }
        }
    }

    /// The team with the strictly higher recorded score.
    pub fn higher_scoring_team(&self) -> Option<TeamId> {
        let (team_a, team_b) = self.both_teams()?;
        let (score_a, score_b) = (self.score_a?, self.score_b?);
        if score_a > score_b {
            Some(team_a)
        } else if score_b > score_a {
            Some(team_b)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Open,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentScope {
    Global,
    Club,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub scope: TournamentScope,
    pub club: Option<ClubId>,
}

/// Administrator authority asserted by whoever authenticated the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClaim {
    pub actor: PlayerId,
    pub global: bool,
    pub club: Option<ClubId>,
}

impl AdminClaim {
    pub fn global(actor: impl Into<PlayerId>) -> Self {
        Self {
            actor: actor.into(),
            global: true,
            club: None,
        }
    }

    pub fn club(actor: impl Into<PlayerId>, club: ClubId) -> Self {
        Self {
            actor: actor.into(),
            global: false,
            club: Some(club),
        }
    }

    pub fn covers(&self, tournament: &Tournament) -> bool {
        if self.global {
            return true;
        }
        tournament.scope == TournamentScope::Club
            && tournament.club.is_some()
            && tournament.club == self.club
    }
}
