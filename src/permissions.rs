use poise::serenity_prelude as serenity;

/// The bot's effective permissions in a guild channel, computed from
/// the cache. `None` when the guild, channel, or the bot's own member
/// is not cached; callers treat that the same as missing permissions.
pub fn bot_permissions_in(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> Option<serenity::Permissions> {
    let bot_id = ctx.cache.current_user().id;
    let guild = ctx.cache.guild(guild_id)?;
    let channel = guild.channels.get(&channel_id)?;
    let bot = guild.members.get(&bot_id)?;
    Some(guild.user_permissions_in(channel, bot))
}

/// Whether `channel_id` is a live text channel the bot can send
/// messages to. Event handlers use a `false` here as the stale-channel
/// signal that triggers a property delete.
pub fn can_send_in_text_channel(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> bool {
    let is_text = ctx
        .cache
        .guild(guild_id)
        .and_then(|guild| guild.channels.get(&channel_id).map(|c| c.kind))
        .is_some_and(|kind| kind == serenity::ChannelType::Text);

    is_text
        && bot_permissions_in(ctx, guild_id, channel_id)
            .is_some_and(|perms| perms.send_messages())
}

/// Permissions the bot needs on the hosting forum channel.
pub fn hosting_permissions() -> serenity::Permissions {
    serenity::Permissions::CREATE_PUBLIC_THREADS
        | serenity::Permissions::MANAGE_THREADS
        | serenity::Permissions::SEND_MESSAGES_IN_THREADS
}
