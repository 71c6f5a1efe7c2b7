//! Runs an [`Interaction`] against a live conversation.

use std::{future::Future, time::Duration};

use log::debug;

use crate::{
    config::Timeouts,
    error::Result,
    responses::{ResponseStore, TeachOutcome},
};

use super::flow::{Interaction, Outcome, Transition};

/// The author/channel pair a teaching conversation talks to.
pub trait Conversation {
    /// Send a message to the channel.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Next message from the author, or `None` once `timeout` has passed.
    fn next_reply(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Drive `interaction` until it finishes. Its opening prompt must already
/// have been sent.
///
/// The store is written only when a full trigger/response pair was
/// collected.
///
/// # Errors
///
/// Returns an error if sending fails or the store cannot be updated.
pub async fn run<C>(
    conversation: &mut C,
    mut interaction: Interaction,
    store: &ResponseStore,
    timeouts: Timeouts,
) -> Result<Outcome>
where
    C: Conversation + Send,
{
    loop {
        let wait = interaction.timeout(&timeouts);
        let transition = match conversation.next_reply(wait).await? {
            Some(reply) => interaction.on_reply(&reply),
            None => interaction.on_timeout(),
        };

        match transition {
            Transition::Prompt { next, message } => {
                debug!("Interaction moved to {next:?}");
                conversation.send(&message).await?;
                interaction = next;
            }
            Transition::Commit { trigger, response } => {
                let outcome = store.teach(&trigger, &response).await?;
                conversation.send(&thanks(&outcome)).await?;
                return Ok(Outcome::Committed);
            }
            Transition::Finish { outcome, message } => {
                debug!("Interaction finished: {outcome:?}");
                conversation.send(&message).await?;
                return Ok(outcome);
            }
        }
    }
}

fn thanks(outcome: &TeachOutcome) -> String {
    match outcome {
        TeachOutcome::Created => "Thanks for teaching me!".to_string(),
        TeachOutcome::Merged { trigger } => {
            format!("Thanks for teaching me! I'll add that to what I say to '{trigger}'.")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::BotError;

    /// Replays scripted replies; `None` or running out means a timeout.
    #[derive(Default)]
    struct Scripted {
        replies: VecDeque<Option<String>>,
        sent: Vec<String>,
        waits: Vec<Duration>,
    }

    impl Scripted {
        fn new(replies: &[Option<&str>]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.map(str::to_string)).collect(),
                ..Self::default()
            }
        }
    }

    impl Conversation for Scripted {
        async fn send(&mut self, text: &str) -> Result<()> {
            self.sent.push(text.to_string());
            Ok(())
        }

        async fn next_reply(&mut self, timeout: Duration) -> Result<Option<String>> {
            self.waits.push(timeout);
            Ok(self.replies.pop_front().flatten())
        }
    }

    fn timeouts() -> Timeouts {
        Timeouts {
            confirm: Duration::from_secs(30),
            teach: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn unmatched_message_can_be_taught() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResponseStore::new(dir.path().join("responses.json"));
        let (interaction, _) = Interaction::confirm("what is the weather");
        let mut conversation = Scripted::new(&[Some("yes"), Some("It's sunny!")]);

        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");

        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(
            conversation.waits,
            [Duration::from_secs(30), Duration::from_secs(60)]
        );
        assert_eq!(conversation.sent.last().map(String::as_str), Some("Thanks for teaching me!"));

        let book = store.snapshot().await.expect("snapshot");
        let record = book.lookup("what is the weather").expect("taught");
        assert_eq!(record.responses, ["It's sunny!"]);
    }

    #[tokio::test]
    async fn declining_leaves_store_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");
        let store = ResponseStore::new(&path);
        let (interaction, _) = Interaction::confirm("what is the weather");
        let mut conversation = Scripted::new(&[Some("no")]);

        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn silence_times_out_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");
        let store = ResponseStore::new(&path);

        let (interaction, _) = Interaction::confirm("what is the weather");
        let mut conversation = Scripted::new(&[]);
        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");
        assert_eq!(outcome, Outcome::TimedOut);
        assert_eq!(conversation.sent.len(), 1);

        let (interaction, _) = Interaction::confirm("what is the weather");
        let mut conversation = Scripted::new(&[Some("yes"), None]);
        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");
        assert_eq!(outcome, Outcome::TimedOut);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn direct_teach_collects_trigger_then_response() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResponseStore::new(dir.path().join("responses.json"));
        let (interaction, _) = Interaction::teach(None);
        let mut conversation = Scripted::new(&[Some(""), Some("good night"), Some("Sleep tight!")]);

        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");

        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(conversation.sent.len(), 3);
        let book = store.snapshot().await.expect("snapshot");
        assert_eq!(book.records[0].trigger, "good night");
        assert_eq!(book.records[0].responses, ["Sleep tight!"]);
    }

    #[tokio::test]
    async fn cancel_at_response_prompt_keeps_existing_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResponseStore::new(dir.path().join("responses.json"));
        store.teach("hello", "hi!").await.expect("seed");

        let (interaction, _) = Interaction::teach(Some("hello".to_string()));
        let mut conversation = Scripted::new(&[Some("cancel")]);
        let outcome = run(&mut conversation, interaction, &store, timeouts())
            .await
            .expect("run");

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(conversation.sent, ["Teaching canceled."]);
        let book = store.snapshot().await.expect("snapshot");
        assert_eq!(book.records[0].responses, ["hi!"]);
    }

    #[tokio::test]
    async fn corrupt_store_surfaces_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");
        std::fs::write(&path, "not json").expect("write");
        let store = ResponseStore::new(&path);

        let (interaction, _) = Interaction::teach(Some("hello".to_string()));
        let mut conversation = Scripted::new(&[Some("hi!")]);
        let result = run(&mut conversation, interaction, &store, timeouts()).await;

        assert!(matches!(result, Err(BotError::StoreParse { .. })));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "not json");
    }
}
