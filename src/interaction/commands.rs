//! Poise commands for teaching new responses.

use log::info;

use crate::bot::Data;
use crate::error::{BotError, Result};

use super::{
    discord::DiscordConversation,
    driver::run,
    flow::Interaction,
    sessions::SessionKey,
};

/// Context type for teaching commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Teach me a new trick.
#[poise::command(prefix_command, slash_command)]
pub async fn teach(
    ctx: Context<'_>,
    #[description = "What people will say to me (I'll ask if you leave it out)"]
    #[rest]
    trigger: Option<String>,
) -> Result<()> {
    let data = ctx.data();
    let key = SessionKey::new(ctx.author().id, ctx.channel_id());
    let Some(session) = data.sessions().try_begin(key) else {
        ctx.say("Let's finish the trick you're already teaching me first!")
            .await?;
        return Ok(());
    };

    let (interaction, prompt) = Interaction::teach(trigger);
    ctx.say(prompt).await?;

    let mut conversation = DiscordConversation::new(
        ctx.serenity_context(),
        ctx.channel_id(),
        ctx.author().id,
        &session,
    );
    let outcome = run(
        &mut conversation,
        interaction,
        data.responses(),
        data.settings().timeouts,
    )
    .await?;

    info!(
        "Teach command from {} in channel {} ended: {outcome:?}",
        ctx.author().tag(),
        ctx.channel_id()
    );
    Ok(())
}

/// Get available teaching commands.
#[must_use]
pub fn teach_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![teach()]
}
