//! Poise commands for the quotebook.

use log::{debug, info};

use crate::bot::Data;
use crate::error::{BotError, Result};

/// Context type for quotebook commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

const AUTOCOMPLETE_LIMIT: usize = 25;

async fn autocomplete_author(ctx: Context<'_>, partial: &str) -> Vec<String> {
    match ctx.data().quotes().snapshot().await {
        Ok(book) => book.search_authors(partial, AUTOCOMPLETE_LIMIT),
        Err(e) => {
            debug!("Author autocomplete unavailable: {e}");
            Vec::new()
        }
    }
}

async fn say_quote(ctx: Context<'_>, author: Option<String>) -> Result<()> {
    let book = ctx.data().quotes().snapshot().await?;
    let quote = book.get_quote(author.as_deref())?;
    ctx.say(quote.to_string()).await?;
    Ok(())
}

/// Share a random quote, optionally from one author.
#[poise::command(prefix_command, slash_command, subcommands("show", "add"))]
pub async fn quotebook(
    ctx: Context<'_>,
    #[description = "Author to quote (optional)"]
    #[rest]
    author: Option<String>,
) -> Result<()> {
    say_quote(ctx, author).await
}

/// Share a random quote, optionally from one author.
#[poise::command(prefix_command, slash_command)]
pub async fn show(
    ctx: Context<'_>,
    #[description = "Author to quote (optional)"]
    #[autocomplete = "autocomplete_author"]
    author: Option<String>,
) -> Result<()> {
    say_quote(ctx, author).await
}

/// Add a quote to the quotebook.
#[poise::command(prefix_command, slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Who said it"]
    #[autocomplete = "autocomplete_author"]
    author: String,
    #[description = "What they said"]
    #[rest]
    quote: String,
) -> Result<()> {
    let filed_under = ctx.data().quotes().add(&author, &quote).await?;
    ctx.say(format!("Added a quote from {filed_under} to the quotebook!"))
        .await?;
    info!(
        "{} added a quote for '{filed_under}' in channel {}",
        ctx.author().tag(),
        ctx.channel_id()
    );
    Ok(())
}

/// Get available quotebook commands.
#[must_use]
pub fn quotebook_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![quotebook()]
}
