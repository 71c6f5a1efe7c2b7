use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Store file not found: {}", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("Store file {} is malformed: {source}", path.display())]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown quote author: {name}")]
    AuthorNotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Quotebook is empty")]
    QuotebookEmpty,

    #[error("Empty argument: {0}")]
    EmptyArgument(&'static str),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns a user-friendly error message suitable for displaying in Discord
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::Serenity(_) => {
                "Sorry, I'm having trouble communicating with Discord right now. Please try again later.".to_string()
            }
            BotError::Config(_) | BotError::EnvVar(_) => {
                "Sorry, there's a configuration issue on my end. Please contact the bot administrator.".to_string()
            }
            BotError::StoreNotFound { .. } | BotError::StoreParse { .. } | BotError::Io(_) => {
                "Heckin uhhh, my memory is in a bad shape right now. Please tell the bot administrator.".to_string()
            }
            BotError::AuthorNotFound { name, suggestion } => match suggestion {
                Some(suggestion) => {
                    format!("I don't have any quotes from '{name}'. Did you mean '{suggestion}'?")
                }
                None => format!("I don't have any quotes from '{name}'."),
            },
            BotError::QuotebookEmpty => {
                "The quotebook is empty. Add one with `quotebook add <author> <quote>`.".to_string()
            }
            BotError::EmptyArgument(what) => format!("The {what} can't be empty."),
        }
    }

    /// Errors that point at a broken deployment rather than a user mistake.
    #[must_use]
    pub fn is_operator_facing(&self) -> bool {
        matches!(
            self,
            BotError::StoreNotFound { .. }
                | BotError::StoreParse { .. }
                | BotError::Io(_)
                | BotError::Config(_)
                | BotError::EnvVar(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
