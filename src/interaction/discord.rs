//! [`Conversation`] over a Discord channel.

use std::time::Duration;

use poise::serenity_prelude::{ChannelId, Context, UserId};

use crate::error::Result;

use super::{driver::Conversation, sessions::SessionGuard};

/// Talks in `channel_id` and listens only to `author_id` there.
///
/// The session claim is renewed before each wait for a reply.
pub struct DiscordConversation<'a> {
    ctx: &'a Context,
    channel_id: ChannelId,
    author_id: UserId,
    session: &'a SessionGuard<'a>,
}

impl<'a> DiscordConversation<'a> {
    #[must_use]
    pub fn new(
        ctx: &'a Context,
        channel_id: ChannelId,
        author_id: UserId,
        session: &'a SessionGuard<'a>,
    ) -> Self {
        Self {
            ctx,
            channel_id,
            author_id,
            session,
        }
    }
}

impl Conversation for DiscordConversation<'_> {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.channel_id.say(&self.ctx.http, text).await?;
        Ok(())
    }

    async fn next_reply(&mut self, timeout: Duration) -> Result<Option<String>> {
        self.session.renew();
        let reply = self
            .channel_id
            .await_reply(self.ctx)
            .author_id(self.author_id)
            .timeout(timeout)
            .await;
        Ok(reply.map(|message| message.content))
    }
}
