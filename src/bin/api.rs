use std::sync::Arc;

use deskbot::DeskBot;
use deskbot::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    deskbot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let bot = DeskBot::new(config).map_err(|e| {
        error!("Failed to initialize bot: {}", e);
        Error::from(e)
    })?;
    info!(sites = bot.reference().sites().len(), "deskbot API starting");

    let bot = Arc::new(bot);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let bot = Arc::clone(&bot);
        async move { deskbot::api::handler(&bot, event).await }
    }))
    .await
}
