use bracket_matchbot::models::{Match, SlotSource};
use bracket_matchbot::propagation::Propagation;
use bracket_matchbot::{BracketError, CompletionReport, ErrorKind, Outcome};

pub(crate) fn failure_text(err: &BracketError) -> String {
    if err.kind() == ErrorKind::Storage {
        log::error!("{:#?}", err);
        return format!("`{}`: something went wrong, contact an admin", err.code());
    }
    format!("`{}`: {}", err.code(), err)
}

fn slot_str(team: Option<i32>, source: SlotSource) -> String {
    match (team, source) {
        (Some(team), _) => format!("team `#{team}`"),
        (None, SlotSource::WinnerOfMatch(upstream)) => format!("winner of `#{upstream}`"),
        (None, SlotSource::Bye) => "bye".to_string(),
        (None, SlotSource::Team(team)) => format!("team `#{team}`"),
    }
}

pub(crate) fn match_info(m: &Match) -> String {
    let mut s = format!("`#{}` ", m.id);
    if let Some(round) = m.round {
        s.push_str(format!("round {round} ").as_str());
    }
    s.push_str(format!("**{}**", m.status).as_str());
    s.push('\n');
    s.push_str(format!("A: {}", slot_str(m.team_a, m.slot_a)).as_str());
    if let Some(score) = m.score_a {
        s.push_str(format!(" **`{score}`**").as_str());
    }
    if m.confirmed_a {
        s.push_str(" ✅");
    }
    s.push('\n');
    s.push_str(format!("B: {}", slot_str(m.team_b, m.slot_b)).as_str());
    if let Some(score) = m.score_b {
        s.push_str(format!(" **`{score}`**").as_str());
    }
    if m.confirmed_b {
        s.push_str(" ✅");
    }
    s.push('\n');
    if let Some(winner) = m.winner {
        s.push_str(format!("Winner: team `#{winner}`").as_str());
        if m.finalized_by_admin {
            s.push_str(" (set by an admin)");
        }
        s.push('\n');
    }
    s
}

pub(crate) fn completion_info(report: &CompletionReport) -> String {
    let mut s = String::new();
    if !report.deleted.is_empty() {
        let ids: Vec<String> = report.deleted.iter().map(|id| format!("`#{id}`")).collect();
        s.push_str(format!("Removed placeholder matches {}\n", ids.join(", ")).as_str());
    }
    match (report.completion.completed, report.completion.final_round) {
        (true, Some(round)) => {
            s.push_str(format!("Tournament finished after round {round}").as_str());
            if let Some(champion) = report.champion {
                s.push_str(format!(", champion: team `#{champion}`").as_str());
            }
        }
        (false, Some(round)) => {
            s.push_str(format!("Tournament still running, final round is {round}").as_str())
        }
        (_, None) => s.push_str("Tournament has no playable matches"),
    }
    s.push('\n');
    for warning in &report.warnings {
        s.push_str(format!("⚠️ {warning}\n").as_str());
    }
    s
}

pub(crate) fn propagation_info(propagation: &Propagation) -> String {
    let mut s = String::new();
    for (id, side) in &propagation.resolved {
        s.push_str(format!("Advanced to match `#{id}` slot {side}\n").as_str());
    }
    for id in &propagation.promoted {
        s.push_str(format!("Match `#{id}` is now scheduled\n").as_str());
    }
    for warning in &propagation.warnings {
        s.push_str(format!("⚠️ {warning}\n").as_str());
    }
    s
}

pub(crate) fn outcome_info(outcome: &Outcome) -> String {
    let mut s = match_info(&outcome.updated);
    if let Some(propagation) = &outcome.propagation {
        for (id, side) in &propagation.resolved {
            s.push_str(format!("Advanced to match `#{id}` slot {side}\n").as_str());
        }
        for id in &propagation.promoted {
            s.push_str(format!("Match `#{id}` is now scheduled\n").as_str());
        }
    }
    if let Some(report) = &outcome.completion {
        if report.closed {
            s.push_str(completion_info(report).as_str());
        }
    }
    for warning in &outcome.warnings {
        s.push_str(format!("⚠️ {warning}\n").as_str());
    }
    s
}
