//! Discord bot core logic and event handling.

use log::{debug, error, info, warn};
use poise::{
    Framework, FrameworkError, FrameworkOptions, PrefixFrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};

use crate::config::{Config, Settings};
use crate::error::{BotError, Result};
use crate::interaction::{Sessions, handle_wake_word, teach_commands};
use crate::quotebook::{QuoteStore, quotebook_commands};
use crate::responses::ResponseStore;

/// Shared state handed to every command and event.
pub struct Data {
    settings: Settings,
    responses: ResponseStore,
    quotes: QuoteStore,
    sessions: Sessions,
}

impl Data {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            responses: ResponseStore::new(&settings.responses_path),
            quotes: QuoteStore::new(&settings.quotes_path),
            sessions: Sessions::for_timeouts(&settings.timeouts),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    #[must_use]
    pub fn quotes(&self) -> &QuoteStore {
        &self.quotes
    }

    #[must_use]
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }
}

/// Context type for general commands.
type CommandContext<'a> = poise::Context<'a, Data, BotError>;

/// Show what I can do.
#[poise::command(prefix_command, slash_command)]
pub async fn help(
    ctx: CommandContext<'_>,
    #[description = "Command to show help about"] command: Option<String>,
) -> Result<()> {
    let extra_text = format!(
        "Say '{}' followed by a question and I'll answer if I know how.",
        ctx.data().settings().wake_word
    );
    builtins::help(
        ctx,
        command.as_deref(),
        builtins::HelpConfiguration {
            extra_text_at_bottom: &extra_text,
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let data = Data::new(config.settings.clone());
    report_store_health(&data).await;

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut commands = teach_commands();
    commands.extend(quotebook_commands());
    commands.push(help());

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands,
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(config.settings.command_prefix.clone()),
                ..Default::default()
            },
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(data)
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

/// Log the state of both stores so a broken file shows up at startup.
async fn report_store_health(data: &Data) {
    match data.responses().snapshot().await {
        Ok(book) => info!("Loaded {} triggers", book.records.len()),
        Err(e) => error!("Response store is unusable: {e}"),
    }
    match data.quotes().snapshot().await {
        Ok(book) => info!("Loaded quotes from {} authors", book.authors.len()),
        Err(e) => error!("Quote store is unusable: {e}"),
    }
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    if let FullEvent::Message { new_message } = event
        && !new_message.author.bot
        && let Err(e) = handle_wake_word(ctx, new_message, data).await
    {
        log_error(&e, &format!("message from {}", new_message.author.tag()));
        new_message.reply(&ctx.http, e.user_message()).await?;
    }
    Ok(())
}

async fn on_error(error: FrameworkError<'_, Data, BotError>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            log_error(&error, &format!("command '{}'", ctx.command().name));
            if let Err(e) = ctx.say(error.user_message()).await {
                warn!("Failed to report command error: {e}");
            }
        }
        other => {
            if let Err(e) = builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

fn log_error(error: &BotError, source: &str) {
    if error.is_operator_facing() {
        error!("Error processing {source}: {error}");
    } else {
        debug!("Reported to user while processing {source}: {error}");
    }
}
