use crate::store::prop;
use crate::{imdb, permissions, showtime, Data, Error};
use poise::serenity_prelude as serenity;
use poise::Modal;
use serenity::Mentionable;
use tracing::warn;

const IMDB_ICON: &str =
    "https://cdn4.iconfinder.com/data/icons/logos-and-brands/512/171_Imdb_logo_logos-1024.png";

type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

#[derive(Debug, Modal)]
#[name = "Host Content"]
struct HostModal {
    #[name = "IMDb link to the content you wish to host"]
    #[placeholder = "https://www.imdb.com/title/tt0926084"]
    #[min_length = 24]
    imdb_link: String,
    #[name = "Enter your timezone"]
    #[placeholder = "e.g., GMT"]
    #[max_length = 32]
    timezone: String,
    #[name = "Start time"]
    #[placeholder = "e.g., 7:30PM"]
    #[min_length = 6]
    #[max_length = 7]
    start_time: String,
    #[name = "Date (day/month) or leave blank for today"]
    #[placeholder = "e.g., 05/02"]
    #[min_length = 5]
    #[max_length = 5]
    start_date: Option<String>,
    #[name = "Room invite ID"]
    #[placeholder = "e.g., ABC123"]
    #[min_length = 6]
    #[max_length = 6]
    room_id: Option<String>,
}

/// Host content on Bigscreen
#[poise::command(slash_command, guild_only)]
pub async fn host(ctx: ApplicationContext<'_>) -> Result<(), Error> {
    let pctx = poise::Context::from(ctx);
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let store = &ctx.data().store;

    // Resolve the hosting channel before showing the modal, healing a
    // stale property on the way.
    let channel_id = store
        .property(guild_id, prop::HOSTING)?
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(serenity::ChannelId::new);

    let usable = channel_id.is_some_and(|id| {
        permissions::bot_permissions_in(ctx.serenity_context(), guild_id, id)
            .is_some_and(|perms| perms.contains(permissions::hosting_permissions()))
    });

    let Some(channel_id) = channel_id.filter(|_| usable) else {
        if channel_id.is_some() || store.property(guild_id, prop::HOSTING)?.is_some() {
            store.delete_property(guild_id, prop::HOSTING)?;
        }
        pctx.say("Hosting is currently disabled on this server. Please reach out to a staff member for assistance in configuring it.")
            .await?;
        return Ok(());
    };

    let Some(input) = HostModal::execute(ctx).await? else {
        return Ok(());
    };

    let date = input.start_date.as_deref().unwrap_or("");
    let title_id = imdb::parse_title_id(&input.imdb_link);
    let timezone_valid = showtime::is_valid_timezone(input.timezone.trim());
    let start = showtime::resolve(&input.start_time, input.timezone.trim(), date);

    let mut invalid = Vec::new();
    if title_id.is_none() {
        invalid.push("IMDb link");
    }
    if !timezone_valid {
        invalid.push("timezone");
    }
    if start.is_none() {
        invalid.push("start time");
    }
    if !invalid.is_empty() {
        let verb = if invalid.len() > 1 { "are" } else { "is" };
        pctx.say(format!(
            "The provided {} {} invalid.\nPlease double-check and try again.",
            invalid.join(" and "),
            verb
        ))
        .await?;
        return Ok(());
    }
    let (Some(title_id), Some(start)) = (title_id, start) else {
        return Ok(());
    };

    pctx.defer().await?;

    let details = match ctx.data().imdb.title_details(&title_id).await {
        Ok(details) => details,
        Err(err) => {
            warn!("Failed to fetch IMDb details for tt{}: {}", title_id, err);
            pctx.say("I could not fetch details for that title. Please try again later.")
                .await?;
            return Ok(());
        }
    };
    let backdrop = ctx.data().imdb.fanart(&details.id, &details.kind).await;

    let start_stamp = format!("<t:{}:F>", start.timestamp());
    let room = input
        .room_id
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "`Unavailable`".to_string());

    let mut embed = serenity::CreateEmbed::new()
        .color(0xE0B10E)
        .author(
            serenity::CreateEmbedAuthor::new(details.heading())
                .url(input.imdb_link.trim())
                .icon_url(IMDB_ICON),
        )
        .description(format!("```text\n{}\n```", details.plot))
        .field(
            "Votes",
            format!(
                "**{}/10** *({} votes)*",
                details.rating,
                thousands(details.votes)
            ),
            true,
        )
        .field("Genres", &details.genres, true)
        .field("Stars", &details.cast, false)
        .field("Hosted By", ctx.author().id.mention().to_string(), false)
        .field("Start Time", &start_stamp, true)
        .field("Room Invite ID", room, true);
    if let Some(image) = backdrop.or_else(|| details.image.clone()) {
        embed = embed.image(image);
    }

    let links = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new_link(input.imdb_link.trim().to_string()).label("Open Content"),
        serenity::CreateButton::new_link(format!("https://imdb.com/title/tt{}/ratings", title_id))
            .label("View Reviews"),
        serenity::CreateButton::new_link(format!(
            "https://imdb.com/title/tt{}/fullcredits",
            title_id
        ))
        .label("View Cast"),
        serenity::CreateButton::new_link(format!("https://imdb.com/title/tt{}/trivia", title_id))
            .label("Trivia"),
    ]);
    let controls = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(format!("host_edit_{}", ctx.author().id))
            .label("Change Details")
            .style(serenity::ButtonStyle::Danger),
        serenity::CreateButton::new(format!("host_lock_{}", ctx.author().id))
            .label("Lock Thread")
            .style(serenity::ButtonStyle::Danger),
    ]);

    let post = serenity::CreateForumPost::new(
        details.heading(),
        serenity::CreateMessage::new()
            .embed(embed)
            .components(vec![links, controls]),
    )
    .auto_archive_duration(serenity::AutoArchiveDuration::OneDay);

    let thread = channel_id
        .create_forum_post(ctx.serenity_context(), post)
        .await?;
    thread
        .id
        .add_thread_member(ctx.serenity_context(), ctx.author().id)
        .await?;

    pctx.say(format!(
        "{} is hosting {}, at {}",
        ctx.author().id.mention(),
        thread.id.mention(),
        start_stamp
    ))
    .await?;
    Ok(())
}

#[derive(Debug, Modal)]
#[name = "Change Details"]
struct ChangeDetailsModal {
    #[name = "Enter your timezone"]
    #[placeholder = "e.g., GMT"]
    #[max_length = 32]
    timezone: Option<String>,
    #[name = "Start time"]
    #[placeholder = "e.g., 7:30PM"]
    #[min_length = 6]
    #[max_length = 7]
    start_time: Option<String>,
    #[name = "Date (day/month) or leave blank for today"]
    #[placeholder = "e.g., 05/02"]
    #[min_length = 5]
    #[max_length = 5]
    start_date: Option<String>,
    #[name = "Room invite ID"]
    #[placeholder = "e.g., ABC123"]
    #[min_length = 6]
    #[max_length = 6]
    room_id: Option<String>,
}

/// Handles the host-thread buttons. Wired to component interactions
/// whose custom id starts with `host_`.
pub async fn handle_component(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(rest) = component.data.custom_id.strip_prefix("host_") else {
        return Ok(());
    };
    let Some((action, owner)) = rest.split_once('_') else {
        return Ok(());
    };

    // Only the original host may use the thread controls
    if owner.parse::<u64>() != Ok(component.user.id.get()) {
        component
            .create_response(
                &ctx.http,
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("This button is reserved for the thread host.")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    match action {
        "lock" => lock_thread(ctx, component).await,
        "edit" => change_details(ctx, component).await,
        _ => Ok(()),
    }
}

async fn lock_thread(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new().content(format!(
                    "Thread has been successfully locked.\nThank you for hosting, {}",
                    component.user.id.mention()
                )),
            ),
        )
        .await?;
    component
        .channel_id
        .edit_thread(&ctx.http, serenity::EditThread::new().locked(true))
        .await?;
    Ok(())
}

/// Adapter so a plain `&serenity::Context` satisfies the
/// `AsRef<serenity::Context>` bound on poise's modal helper.
struct CtxRef<'a>(&'a serenity::Context);

impl AsRef<serenity::Context> for CtxRef<'_> {
    fn as_ref(&self) -> &serenity::Context {
        self.0
    }
}

async fn change_details(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(input) =
        poise::execute_modal_on_component_interaction::<ChangeDetailsModal>(
            CtxRef(ctx),
            component.clone(),
            None,
            None,
        )
        .await?
    else {
        return Ok(());
    };

    if input.timezone.is_none() && input.start_time.is_none() && input.room_id.is_none() {
        return Ok(());
    }

    // Timezone and start time travel together
    if input.timezone.is_some() != input.start_time.is_some() {
        component
            .channel_id
            .say(&ctx.http, "Both timezone and start time are optional, but if you modify one, you need to update both together. Please provide both or leave both unchanged.")
            .await?;
        return Ok(());
    }
    if input.start_date.is_some() && input.start_time.is_none() {
        component
            .channel_id
            .say(&ctx.http, "If you provide a start date, you must also provide both timezone and start time.")
            .await?;
        return Ok(());
    }

    let new_start = match (&input.timezone, &input.start_time) {
        (Some(timezone), Some(start_time)) => {
            let date = input.start_date.as_deref().unwrap_or("");
            let timezone_valid = showtime::is_valid_timezone(timezone.trim());
            let start = showtime::resolve(start_time, timezone.trim(), date);

            if !timezone_valid || start.is_none() {
                let mut invalid = Vec::new();
                if !timezone_valid {
                    invalid.push("timezone");
                }
                if start.is_none() {
                    invalid.push("start time");
                }
                let verb = if invalid.len() > 1 { "are" } else { "is" };
                component
                    .channel_id
                    .say(
                        &ctx.http,
                        format!(
                            "The provided {} {} invalid.\nPlease double-check and try again.",
                            invalid.join(" and "),
                            verb
                        ),
                    )
                    .await?;
                return Ok(());
            }
            start
        }
        _ => None,
    };

    let Some(old) = component.message.embeds.first() else {
        component
            .channel_id
            .say(&ctx.http, "An error occurred. Please try again.")
            .await?;
        return Ok(());
    };

    let start_value = new_start.map(|start| format!("<t:{}:F>", start.timestamp()));
    let room_value = input.room_id.as_deref().map(str::to_uppercase);

    let mut summary = String::from("Details Updated:\n");
    let mut fields = Vec::with_capacity(old.fields.len());
    for field in &old.fields {
        let value = match field.name.as_str() {
            "Start Time" => {
                if let Some(new) = &start_value {
                    summary.push_str(&format!("Start Time: ~~{}~~ > {}\n", field.value, new));
                    new.clone()
                } else {
                    field.value.clone()
                }
            }
            "Room Invite ID" => {
                if let Some(new) = &room_value {
                    summary.push_str(&format!("Invite ID: ~~{}~~ > `{}`\n", field.value, new));
                    new.clone()
                } else {
                    field.value.clone()
                }
            }
            _ => field.value.clone(),
        };
        fields.push((field.name.clone(), value, field.inline));
    }

    let mut embed = serenity::CreateEmbed::new().fields(fields);
    if let Some(colour) = old.colour {
        embed = embed.color(colour);
    }
    if let Some(author) = &old.author {
        let mut builder = serenity::CreateEmbedAuthor::new(&author.name);
        if let Some(url) = &author.url {
            builder = builder.url(url);
        }
        if let Some(icon) = &author.icon_url {
            builder = builder.icon_url(icon);
        }
        embed = embed.author(builder);
    }
    if let Some(description) = &old.description {
        embed = embed.description(description);
    }
    if let Some(image) = &old.image {
        embed = embed.image(&image.url);
    }

    let mut message = (*component.message).clone();
    message
        .edit(ctx, serenity::EditMessage::new().embed(embed))
        .await?;

    component.channel_id.say(&ctx.http, summary).await?;
    Ok(())
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(550000), "550,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
