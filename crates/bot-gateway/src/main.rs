//! Bot gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p bot-gateway
//! ```
//!
//! Configuration is loaded from environment variables (a `.env` file is honored):
//! `BOT_APP_ID`, `BOT_SECRET` and `BOT_INTENTS` (comma separated) are required;
//! `BOT_SANDBOX`, `APP_ENV`, `GATEWAY_MAX_RETRIES`, `GATEWAY_RECONNECT_DELAY_MS`,
//! `GATEWAY_HEARTBEAT_GRACE_MS`, `GATEWAY_HANDSHAKE_TIMEOUT_MS` and `API_TIMEOUT_MS`
//! are optional.

use bot_api::{ApiConfig, HttpApi};
use bot_common::{try_init_tracing_with_config, AppAccessTokenProvider, AppConfig, AppError, CredentialProvider, TracingConfig};
use bot_core::EventName;
use bot_gateway::{DispatchEvent, GatewayClient, GatewayConfig};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Bot gateway stopped");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        intents = %config.bot.intents,
        sandbox = config.bot.sandbox,
        "Configuration loaded"
    );

    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(AppAccessTokenProvider::new(&config.bot.app_id, &config.bot.secret));

    let api = HttpApi::new(
        ApiConfig::new(&config.bot.app_id)
            .with_sandbox(config.bot.sandbox)
            .with_timeout(config.api.timeout()),
        Arc::clone(&credentials),
    )
    .map_err(AppError::api)?;

    let gateway = api.get_gateway().await.map_err(AppError::api)?;
    info!(url = %gateway.url, "Gateway URL resolved");

    let client = GatewayClient::builder()
        .config(GatewayConfig::from_settings(config.bot.intents, &config.gateway))
        .credentials(credentials)
        .build()
        .map_err(AppError::gateway)?;

    register_handlers(&client);

    let session = client.connect(gateway.url);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            session.disconnect();
            session.closed().await;
            Ok(())
        }
        reason = session.closed() => Err(AppError::SessionClosed(reason.to_string())),
    }
}

/// Log readiness and incoming messages
fn register_handlers(client: &GatewayClient) {
    let router = client.router();

    router.on(EventName::SessionReady, |event: DispatchEvent| async move {
        let username = event.payload()["user"]["username"].as_str().unwrap_or_default().to_string();
        info!(username = %username, "Bot is online");
        anyhow::Ok(())
    });

    for name in [
        EventName::AtMessageCreate,
        EventName::DirectMessageCreate,
        EventName::GroupAtMessageCreate,
        EventName::C2cMessageCreate,
    ] {
        router.on(name, |event: DispatchEvent| async move {
            let content = event.payload()["content"].as_str().unwrap_or_default().trim().to_string();
            info!(
                event = %event.name(),
                sequence = ?event.sequence(),
                reply_to = ?event.reply_target().map(ToString::to_string),
                content = %content,
                "Message received"
            );
            anyhow::Ok(())
        });
    }
}
