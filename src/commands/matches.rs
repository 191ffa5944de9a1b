use crate::utils::{failure_text, match_info, outcome_info};
use crate::Context;
use anyhow::Result;
use poise::command;

#[command(
    slash_command,
    guild_only,
    subcommands("submit", "confirm", "info", "team")
)]
pub(crate) async fn bracket(_context: Context<'_>) -> Result<()> {
    Ok(())
}

#[command(
    slash_command,
    guild_only,
    ephemeral,
    description_localized("en-US", "Submit the score of your match")
)]
pub(crate) async fn submit(
    context: Context<'_>,
    #[description = "Match number"] match_id: i32,
    #[description = "Score of team A"] score_a: i64,
    #[description = "Score of team B"] score_b: i64,
) -> Result<()> {
    let bracket = &context.data().bracket;
    let author = context.author().id.0.to_string();
    match bracket.submit_score(match_id, &author, score_a, score_b).await {
        Ok(outcome) => {
            context
                .say(format!(
                    "Score submitted, waiting for the other captain to `/bracket confirm {}`\n{}",
                    match_id,
                    outcome_info(&outcome)
                ))
                .await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(
    slash_command,
    guild_only,
    ephemeral,
    description_localized("en-US", "Confirm the score the other captain submitted")
)]
pub(crate) async fn confirm(
    context: Context<'_>,
    #[description = "Match number"] match_id: i32,
) -> Result<()> {
    let bracket = &context.data().bracket;
    let author = context.author().id.0.to_string();
    match bracket.confirm_score(match_id, &author).await {
        Ok(outcome) => {
            context.say(outcome_info(&outcome)).await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(
    slash_command,
    guild_only,
    ephemeral,
    description_localized("en-US", "Show info for a match")
)]
pub(crate) async fn info(
    context: Context<'_>,
    #[description = "Match number"] match_id: i32,
) -> Result<()> {
    let bracket = &context.data().bracket;
    match bracket.get_match(match_id).await {
        Ok(m) => {
            context.say(match_info(&m)).await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(
    slash_command,
    guild_only,
    ephemeral,
    description_localized("en-US", "Show a team and its captain")
)]
pub(crate) async fn team(
    context: Context<'_>,
    #[description = "Team number"] team_id: i32,
) -> Result<()> {
    crate::commands::team::show(context, team_id).await
}
