use crate::permissions;
use crate::store::prop;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

/// Configure the event logging module
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn logging(
    ctx: Context<'_>,
    #[description = "The channel event logs will send to"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let perms = permissions::bot_permissions_in(ctx.serenity_context(), guild_id, channel.id)
        .unwrap_or_default();
    if !perms.send_messages() {
        ctx.say(format!(
            "I am missing the `SendMessages` permission in {}.\nPlease grant me this permission and try running the command again.",
            channel.id.mention()
        ))
        .await?;
        return Ok(());
    }

    ctx.data()
        .store
        .set_property(guild_id, prop::EVENT_LOGGING, channel.id.to_string())?;

    ctx.say(format!("Event logs will now send to {}.", channel.id.mention()))
        .await?;
    Ok(())
}
