//! Wake-word handler: answer from the response book or offer to learn.

use log::{debug, info};
use poise::serenity_prelude::{Context, Message as SerenityMessage};

use crate::{
    bot::Data,
    error::Result,
    matcher::{contains_wake_word, strip_wake_word},
};

use super::{
    discord::DiscordConversation,
    driver::run,
    flow::Interaction,
    sessions::SessionKey,
};

/// Handle a message that may mention the wake word.
///
/// Returns `true` if the bot responded.
pub async fn handle_wake_word(
    ctx: &Context,
    new_message: &SerenityMessage,
    data: &Data,
) -> Result<bool> {
    let settings = data.settings();
    if !contains_wake_word(&new_message.content, &settings.wake_word)
        || new_message.content.starts_with(&settings.command_prefix)
    {
        return Ok(false);
    }

    let key = SessionKey::new(new_message.author.id, new_message.channel_id);
    if data.sessions().is_active(key) {
        debug!(
            "Ignoring wake word from {} while teaching is in progress",
            new_message.author.tag()
        );
        return Ok(false);
    }

    let query = strip_wake_word(&new_message.content, &settings.wake_word);
    if query.is_empty() {
        new_message
            .reply(
                &ctx.http,
                format!(
                    "Heckin hi! Ask me something, or teach me a trick with `{}teach`.",
                    settings.command_prefix
                ),
            )
            .await?;
        return Ok(true);
    }

    let book = data.responses().snapshot().await?;
    if let Some(record) = book.lookup(&query) {
        let answer = record
            .pick_response()
            .unwrap_or("I don't have an answer for that question yet.");
        new_message.channel_id.say(&ctx.http, answer).await?;
        info!(
            "Answered {} in channel {} with trigger '{}'",
            new_message.author.tag(),
            new_message.channel_id,
            record.trigger
        );
        return Ok(true);
    }

    let Some(session) = data.sessions().try_begin(key) else {
        return Ok(false);
    };

    let (interaction, prompt) = Interaction::confirm(query);
    new_message.channel_id.say(&ctx.http, prompt).await?;

    let mut conversation = DiscordConversation::new(
        ctx,
        new_message.channel_id,
        new_message.author.id,
        &session,
    );
    let outcome = run(
        &mut conversation,
        interaction,
        data.responses(),
        settings.timeouts,
    )
    .await?;

    info!(
        "Teaching offer to {} in channel {} ended: {outcome:?}",
        new_message.author.tag(),
        new_message.channel_id
    );
    Ok(true)
}
