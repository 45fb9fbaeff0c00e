use crate::store::prop;
use crate::{Context, Error};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Module {
    Autorole,
    Event,
    Welcome,
    Logging,
}

impl Module {
    fn property(self) -> &'static str {
        match self {
            Module::Autorole => prop::AUTOROLE,
            Module::Event => prop::HOSTING,
            Module::Welcome => prop::WELCOME,
            Module::Logging => prop::EVENT_LOGGING,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Module::Autorole => "Autorole",
            Module::Event => "Event",
            Module::Welcome => "Welcome",
            Module::Logging => "Logging",
        }
    }
}

/// Disable modules for the bot
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn disable(
    ctx: Context<'_>,
    #[description = "Which module should be disabled?"] module: Module,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let store = &ctx.data().store;

    if store.property(guild_id, module.property())?.is_some() {
        store.delete_property(guild_id, module.property())?;
        ctx.say(format!("{} has been successfully disabled.", module.label()))
            .await?;
    } else {
        ctx.say(format!("{} is not currently enabled.", module.label()))
            .await?;
    }
    Ok(())
}
