use std::sync::Arc;

use burrito_bob::bot::Bot;
use burrito_bob::config::BotConfig;
use burrito_bob::gateway::SlackGateway;
use burrito_bob::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export BOT_API_KEY=xoxb-...");
        eprintln!("  export SLACK_APP_TOKEN=xapp-...");
        std::process::exit(1);
    });

    eprintln!("🌯 Burrito Bob v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Bot name: {}", config.bot_name);
    eprintln!("   Fillings: {}", config.fillings.join(", "));
    eprintln!("   Order window: {}s", config.order_timeout.as_secs());
    eprintln!("   Liveness: http://0.0.0.0:{}/\n", config.port);

    // Liveness endpoint keeps the host's idle reaper away
    let _server_handle = server::spawn(config.port);

    let gateway = Arc::new(SlackGateway::new(
        config.bot_token.clone(),
        config.app_token.clone(),
    ));

    let mut bot = Bot::new(config, gateway);
    bot.run().await?;

    Ok(())
}
