use anyhow::Result;
use bracket_matchbot::config::Config;
use bracket_matchbot::store::PgStore;
use bracket_matchbot::Bracket;
use log::info;
use serenity::model::gateway::GatewayIntents;
use serenity::model::id::GuildId;
use sqlx::postgres::PgPoolOptions;

mod commands;
mod utils;

pub struct Data {
    pub bracket: Bracket<PgStore>,
    pub config: Config,
}

pub(crate) type Context<'a> = poise::Context<'a, Data, anyhow::Error>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let store = PgStore::new(pool);
    store.migrate().await?;

    let token = config.discord_token.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::matches::bracket(), commands::admin::admin()],
            ..Default::default()
        })
        .token(token)
        .intents(GatewayIntents::non_privileged())
        .setup(move |context, ready, framework| {
            Box::pin(async move {
                let commands = &framework.options().commands;
                match config.guild_id {
                    Some(guild) => {
                        poise::builtins::register_in_guild(context, commands, GuildId(guild))
                            .await?
                    }
                    None => poise::builtins::register_globally(context, commands).await?,
                }
                info!("{} is connected!", ready.user.name);
                Ok(Data {
                    bracket: Bracket::new(store),
                    config,
                })
            })
        });
    framework.run().await?;
    Ok(())
}
