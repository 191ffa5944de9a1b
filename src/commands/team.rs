use crate::utils::failure_text;
use crate::Context;
use anyhow::Result;

pub(crate) async fn show(context: Context<'_>, team_id: i32) -> Result<()> {
    let bracket = &context.data().bracket;
    let roster = match bracket.roster(team_id).await {
        Ok(roster) => roster,
        Err(err) => {
            context.say(failure_text(&err)).await?;
            return Ok(());
        }
    };

    let captain = match &roster.captain {
        Some(captain) => format!("<@{captain}>"),
        None => "none, the team has no members".to_string(),
    };
    let members = roster
        .members
        .iter()
        .filter(|member| Some(*member) != roster.captain.as_ref())
        .map(|member| format!("<@{member}>"))
        .collect::<Vec<_>>()
        .join(", ");

    context
        .say(format!(
            "Team **{name}** (`#{id}`)\n\tCaptain: {captain}\n\tMembers: {members}",
            name = roster.team.name,
            id = roster.team.id
        ))
        .await?;
    Ok(())
}
