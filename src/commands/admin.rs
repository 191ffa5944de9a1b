use super::super::Context;
use crate::utils::{completion_info, failure_text, outcome_info, propagation_info};
use anyhow::Result;
use poise::command;

#[command(
    slash_command,
    guild_only,
    ephemeral,
    default_member_permissions = "MODERATE_MEMBERS",
    subcommands("start", "finalize", "propagate", "complete")
)]
pub(crate) async fn admin(_context: Context<'_>) -> Result<()> {
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
pub(crate) async fn start(context: Context<'_>, match_id: i32) -> Result<()> {
    let data = context.data();
    let claim = data.config.admin_claim(context.author().id.0.to_string());
    match data.bracket.start_match(match_id, &claim).await {
        Ok(outcome) => {
            context
                .say(format!("Match started\n{}", outcome_info(&outcome)))
                .await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
pub(crate) async fn finalize(
    context: Context<'_>,
    match_id: i32,
    score_a: i64,
    score_b: i64,
) -> Result<()> {
    let data = context.data();
    let claim = data.config.admin_claim(context.author().id.0.to_string());
    match data
        .bracket
        .admin_finalize(match_id, &claim, score_a, score_b)
        .await
    {
        Ok(outcome) => {
            context
                .say(format!("Result forced\n{}", outcome_info(&outcome)))
                .await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
pub(crate) async fn propagate(context: Context<'_>, match_id: i32) -> Result<()> {
    let data = context.data();
    let claim = data.config.admin_claim(context.author().id.0.to_string());
    match data.bracket.propagate_from(match_id, &claim).await {
        Ok(propagation) if propagation.resolved.is_empty() && propagation.promoted.is_empty() => {
            context
                .say(format!("Nothing left to fill from match `#{match_id}`"))
                .await?;
        }
        Ok(propagation) => {
            context.say(propagation_info(&propagation)).await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
pub(crate) async fn complete(context: Context<'_>, tournament_id: i32) -> Result<()> {
    let bracket = &context.data().bracket;
    match bracket.check_completion(tournament_id).await {
        Ok(report) => {
            context.say(completion_info(&report)).await?;
        }
        Err(err) => {
            context.say(failure_text(&err)).await?;
        }
    }
    Ok(())
}
