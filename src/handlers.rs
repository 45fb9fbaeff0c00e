use crate::permissions;
use crate::store::prop;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{info, warn};

/// Member join: welcome message plus autorole, each independently
/// self-healing when its configured target has gone stale.
pub async fn guild_member_addition(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<(), Error> {
    send_welcome(ctx, data, member).await?;
    assign_autorole(ctx, data, member).await?;
    Ok(())
}

async fn send_welcome(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<(), Error> {
    let guild_id = member.guild_id;
    let Some(raw) = data.store.property(guild_id, prop::WELCOME)? else {
        return Ok(());
    };

    let channel_id = raw.parse::<u64>().map(serenity::ChannelId::new);
    let Ok(channel_id) = channel_id else {
        data.store.delete_property(guild_id, prop::WELCOME)?;
        return Ok(());
    };

    if !permissions::can_send_in_text_channel(ctx, guild_id, channel_id) {
        info!("Welcome channel {} stale in guild {}, removing", channel_id, guild_id);
        data.store.delete_property(guild_id, prop::WELCOME)?;
        return Ok(());
    }

    // Count human members from the cache; fall back to the raw member
    // count when the member list has not been chunked yet.
    let member_count = ctx
        .cache
        .guild(guild_id)
        .map(|guild| {
            let humans = guild.members.values().filter(|m| !m.user.bot).count() as u64;
            if humans > 0 {
                humans
            } else {
                guild.member_count
            }
        })
        .unwrap_or(1);

    let embed = serenity::CreateEmbed::new()
        .color(0x2A2E35)
        .title(format!("Welcome {}", member.display_name()))
        .description(format!(
            "Welcome to CineSquad!\nYou are our {} member!",
            ordinal(member_count)
        ))
        .thumbnail(member.face())
        .image(&data.config.welcome_banner_url);

    channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

async fn assign_autorole(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<(), Error> {
    let guild_id = member.guild_id;
    let Some(raw) = data.store.property(guild_id, prop::AUTOROLE)? else {
        return Ok(());
    };

    let role_id = raw.parse::<u64>().map(serenity::RoleId::new);
    let Ok(role_id) = role_id else {
        data.store.delete_property(guild_id, prop::AUTOROLE)?;
        return Ok(());
    };

    let role_exists = ctx
        .cache
        .guild(guild_id)
        .is_some_and(|guild| guild.roles.contains_key(&role_id));
    if !role_exists {
        info!("Autorole {} stale in guild {}, removing", role_id, guild_id);
        data.store.delete_property(guild_id, prop::AUTOROLE)?;
        return Ok(());
    }

    if let Err(err) = member.add_role(&ctx.http, role_id).await {
        warn!("Failed to assign autorole {} in guild {}: {}", role_id, guild_id, err);
        data.store.delete_property(guild_id, prop::AUTOROLE)?;
    }
    Ok(())
}

/// Member leave: log to the configured event-logging channel.
pub async fn guild_member_removal(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) -> Result<(), Error> {
    let Some(channel_id) = logging_channel(ctx, data, guild_id)? else {
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .color(0xFE4611)
        .author(serenity::CreateEmbedAuthor::new("Member Left").icon_url(user.face()))
        .thumbnail(user.face())
        .description(format!("{} - `@{}`", user.id.mention(), user.tag()))
        .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", user.id)))
        .timestamp(serenity::Timestamp::now());

    channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

/// Ban added: log to the configured event-logging channel, with the
/// ban reason when the ban list still has it.
pub async fn guild_ban_addition(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) -> Result<(), Error> {
    let Some(channel_id) = logging_channel(ctx, data, guild_id)? else {
        return Ok(());
    };

    let reason = guild_id
        .bans(&ctx.http, None, None)
        .await
        .ok()
        .and_then(|bans| bans.into_iter().find(|ban| ban.user.id == user.id))
        .and_then(|ban| ban.reason);

    let mut embed = serenity::CreateEmbed::new()
        .color(0xFE4611)
        .author(serenity::CreateEmbedAuthor::new("Member Banned").icon_url(user.face()))
        .thumbnail(user.face())
        .description(format!("{} - `@{}`", user.id.mention(), user.tag()))
        .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", user.id)))
        .timestamp(serenity::Timestamp::now());

    if let Some(reason) = reason {
        embed = embed.field("Reason", format!("`{}`", reason), false);
    }

    channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

/// The usable event-logging channel, deleting the property when the
/// stored channel no longer exists or the bot cannot send to it.
fn logging_channel(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
) -> Result<Option<serenity::ChannelId>, Error> {
    let Some(raw) = data.store.property(guild_id, prop::EVENT_LOGGING)? else {
        return Ok(None);
    };

    let channel_id = match raw.parse::<u64>() {
        Ok(id) => serenity::ChannelId::new(id),
        Err(_) => {
            data.store.delete_property(guild_id, prop::EVENT_LOGGING)?;
            return Ok(None);
        }
    };

    if !permissions::can_send_in_text_channel(ctx, guild_id, channel_id) {
        info!("Logging channel {} stale in guild {}, removing", channel_id, guild_id);
        data.store.delete_property(guild_id, prop::EVENT_LOGGING)?;
        return Ok(None);
    }

    Ok(Some(channel_id))
}

/// "1st", "2nd", "3rd", "11th", ...
pub fn ordinal(n: u64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(102), "102nd");
        assert_eq!(ordinal(111), "111th");
    }
}
