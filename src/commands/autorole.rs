use crate::store::prop;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

enum RoleCheck {
    Ok,
    BotMissingManageRoles,
    AboveBot,
    AboveAuthor,
}

/// Set the role users will be given upon joining
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn autorole(
    ctx: Context<'_>,
    #[description = "The role users will be given upon joining"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let bot_id = ctx.serenity_context().cache.current_user().id;

    // Cache-only checks, scoped so the guard is dropped before awaiting
    let verdict = {
        let guild = ctx.guild().ok_or("Must be run in a guild")?;
        match guild.members.get(&bot_id) {
            None => RoleCheck::BotMissingManageRoles,
            Some(bot) if !guild.member_permissions(bot).manage_roles() => {
                RoleCheck::BotMissingManageRoles
            }
            Some(bot) => {
                let bot_highest = guild
                    .member_highest_role(bot)
                    .map(|r| r.position)
                    .unwrap_or(0);
                let author_highest = guild
                    .members
                    .get(&ctx.author().id)
                    .and_then(|member| guild.member_highest_role(member))
                    .map(|r| r.position)
                    .unwrap_or(0);

                if role.position >= bot_highest {
                    RoleCheck::AboveBot
                } else if role.position >= author_highest {
                    RoleCheck::AboveAuthor
                } else {
                    RoleCheck::Ok
                }
            }
        }
    };

    match verdict {
        RoleCheck::BotMissingManageRoles => {
            ctx.say("I am missing the `ManageRoles` permission.\nPlease grant me this permission and try running the command again.")
                .await?;
        }
        RoleCheck::AboveBot => {
            ctx.say("The specified role exceeds my highest role.").await?;
        }
        RoleCheck::AboveAuthor => {
            ctx.say("The specified role exceeds your highest role.").await?;
        }
        RoleCheck::Ok => {
            ctx.data()
                .store
                .set_property(guild_id, prop::AUTOROLE, role.id.to_string())?;
            ctx.say(format!(
                "New members will now automatically be given {}.",
                role.id.mention()
            ))
            .await?;
        }
    }
    Ok(())
}
