use order_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment()?;

    print_banner();

    tracing::info!("order-server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. Server state (work dir, engine)
    let state = ServerState::initialize(&config)?;

    // 4. HTTP server (spawns background tasks)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
