#[tokio::main]
async fn main() -> blubbert::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("blubbert=info,serenity=warn"),
    )
    .init();
    log::info!("Starting blubbert Discord bot");

    match blubbert::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
