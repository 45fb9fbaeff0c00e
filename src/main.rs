use cinesquad::commands::{autorole, disable, event, host, logging, say, welcome};
use cinesquad::{config::Config, db::Database, handlers, imdb::ImdbClient, store::GuildStore, Data};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                welcome::welcome(),
                autorole::autorole(),
                logging::logging(),
                event::event(),
                disable::disable(),
                say::say(),
                host::host(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::GuildMemberAddition { new_member } => {
                            if let Err(err) =
                                handlers::guild_member_addition(ctx, data, new_member).await
                            {
                                error!("Member join handler failed: {}", err);
                            }
                        }
                        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
                            if let Err(err) =
                                handlers::guild_member_removal(ctx, data, *guild_id, user).await
                            {
                                error!("Member leave handler failed: {}", err);
                            }
                        }
                        serenity::FullEvent::GuildBanAddition {
                            guild_id,
                            banned_user,
                        } => {
                            if let Err(err) =
                                handlers::guild_ban_addition(ctx, data, *guild_id, banned_user)
                                    .await
                            {
                                error!("Ban handler failed: {}", err);
                            }
                        }
                        serenity::FullEvent::InteractionCreate {
                            interaction: serenity::Interaction::Component(component),
                        } if component.data.custom_id.starts_with("host_") => {
                            if let Err(err) = host::handle_component(ctx, component).await {
                                error!("Host button handler failed: {}", err);
                            }
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                if config.register_commands {
                    match config.dev_guild_id {
                        Some(id) => {
                            poise::builtins::register_in_guild(
                                ctx,
                                &framework.options().commands,
                                serenity::GuildId::new(id),
                            )
                            .await?
                        }
                        None => {
                            poise::builtins::register_globally(ctx, &framework.options().commands)
                                .await?
                        }
                    }
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let db = Database::open(&config.database_path)?;
                db.execute_init()?;
                let store = GuildStore::new(db);
                let imdb = ImdbClient::new(reqwest::Client::new(), config.fanart_api_key.clone());

                Ok(Data {
                    config,
                    store,
                    imdb,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
