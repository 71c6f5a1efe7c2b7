//! Teaching conversation as an explicit state machine.

use std::time::Duration;

use crate::config::Timeouts;

/// Reply that accepts the offer to teach.
pub const CONFIRM_KEYWORD: &str = "yes";

/// Reply that abandons teaching at a trigger or response prompt.
pub const CANCEL_KEYWORD: &str = "cancel";

/// A pending teaching conversation with one author in one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Asked whether the author wants to teach a response for `trigger`.
    AwaitingConfirmation { trigger: String },
    /// Asked for the phrase to react to.
    AwaitingTrigger,
    /// Asked what to say to `trigger`.
    AwaitingResponse { trigger: String },
}

/// How a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    Cancelled,
    TimedOut,
}

/// Result of feeding one event into an [`Interaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Send `message` and wait in `next`.
    Prompt { next: Interaction, message: String },
    /// The pair is complete and should be stored.
    Commit { trigger: String, response: String },
    /// Send `message` and stop without touching the store.
    Finish { outcome: Outcome, message: String },
}

impl Interaction {
    /// Offer to learn `trigger` after it matched nothing.
    #[must_use]
    pub fn confirm(trigger: impl Into<String>) -> (Self, String) {
        (
            Interaction::AwaitingConfirmation {
                trigger: trigger.into(),
            },
            "Heckin Uhhh, I'm not sure about that. Would you like to teach me a new trick? (Yes/No)"
                .to_string(),
        )
    }

    /// Start teaching directly, asking for the trigger unless one is given.
    #[must_use]
    pub fn teach(trigger: Option<String>) -> (Self, String) {
        match trigger.filter(|trigger| !trigger.trim().is_empty()) {
            Some(trigger) => {
                let trigger = trigger.trim().to_string();
                let message = response_prompt(&trigger);
                (Interaction::AwaitingResponse { trigger }, message)
            }
            None => (
                Interaction::AwaitingTrigger,
                format!("What trick would you like to teach me? (Type '{CANCEL_KEYWORD}' to cancel)"),
            ),
        }
    }

    /// How long to wait for the author in this state.
    #[must_use]
    pub fn timeout(&self, timeouts: &Timeouts) -> Duration {
        match self {
            Interaction::AwaitingConfirmation { .. } => timeouts.confirm,
            Interaction::AwaitingTrigger | Interaction::AwaitingResponse { .. } => timeouts.teach,
        }
    }

    #[must_use]
    pub fn on_reply(self, reply: &str) -> Transition {
        let reply = reply.trim();

        match self {
            Interaction::AwaitingConfirmation { trigger } => {
                if reply.eq_ignore_ascii_case(CONFIRM_KEYWORD) {
                    Transition::Prompt {
                        message: response_prompt(&trigger),
                        next: Interaction::AwaitingResponse { trigger },
                    }
                } else {
                    Transition::Finish {
                        outcome: Outcome::Cancelled,
                        message: "Alright, let me know if you change your mind!".to_string(),
                    }
                }
            }
            _ if reply.eq_ignore_ascii_case(CANCEL_KEYWORD) => cancelled(),
            state if reply.is_empty() => Transition::Prompt {
                next: state,
                message: "I need some text to learn from. Try again?".to_string(),
            },
            Interaction::AwaitingTrigger => Transition::Prompt {
                message: response_prompt(reply),
                next: Interaction::AwaitingResponse {
                    trigger: reply.to_string(),
                },
            },
            Interaction::AwaitingResponse { trigger } => Transition::Commit {
                trigger,
                response: reply.to_string(),
            },
        }
    }

    #[must_use]
    pub fn on_timeout(self) -> Transition {
        Transition::Finish {
            outcome: Outcome::TimedOut,
            message: "Sorry, I didn't hear back in time. Teaching request timed out, please try again."
                .to_string(),
        }
    }
}

fn response_prompt(trigger: &str) -> String {
    format!(
        "Got it! What fun quirky thing should I say to '{trigger}'? (Type '{CANCEL_KEYWORD}' to cancel)"
    )
}

fn cancelled() -> Transition {
    Transition::Finish {
        outcome: Outcome::Cancelled,
        message: "Teaching canceled.".to_string(),
    }
}
