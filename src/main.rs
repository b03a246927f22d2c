use std::error::Error;

use tracing::{Level, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; variables may come from the environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(ai_llm_service::telemetry::env_filter_with_level("warn", Level::INFO))
        .with(ai_llm_service::telemetry::layer())
        .try_init()?;

    if let Err(e) = dotenv {
        warn!(error = %e, ".env not loaded");
    }

    api::start().await?;

    Ok(())
}
