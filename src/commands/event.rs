use crate::permissions;
use crate::store::prop;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

/// Configure the hosting module
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn event(
    ctx: Context<'_>,
    #[description = "The forum channel host threads will start in"]
    #[channel_types("Forum")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let perms = permissions::bot_permissions_in(ctx.serenity_context(), guild_id, channel.id)
        .unwrap_or_default();
    if !perms.contains(permissions::hosting_permissions()) {
        ctx.say(format!(
            "I am missing thread permissions in {}.\nPlease grant me `CreatePublicThreads`, `ManageThreads` and `SendMessagesInThreads` and try running the command again.",
            channel.id.mention()
        ))
        .await?;
        return Ok(());
    }

    ctx.data()
        .store
        .set_property(guild_id, prop::HOSTING, channel.id.to_string())?;

    ctx.say(format!(
        "Host threads will now start in {}.",
        channel.id.mention()
    ))
    .await?;
    Ok(())
}
