use crate::{Context, Error};

/// Send a message as the bot
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn say(
    ctx: Context<'_>,
    #[description = "The text to send as the bot"]
    #[min_length = 4]
    text: String,
) -> Result<(), Error> {
    ctx.channel_id().say(ctx.serenity_context(), text).await?;

    ctx.send(
        poise::CreateReply::default()
            .content("Message sent.")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
