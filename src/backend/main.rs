/**
 * xflock Server Entry Point
 *
 * This is the main entry point for the section lock server.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use xflock::backend::server::config::{load_config, server_port};

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[STARTUP] Server initialization started");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("[STARTUP] Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let app = match xflock::backend::server::init::create_app(config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("[STARTUP] {}", e);
            return Err(e.into());
        }
    };

    let port = server_port();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("[STARTUP] Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin xflock-server --features ssr");
    std::process::exit(1);
}
