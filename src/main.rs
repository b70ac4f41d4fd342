use litecrud::{api_routes, AppState, Config, HandleProvider};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("litecrud=info".parse()?))
        .init();

    let config = Config::from_env();
    let provider = if config.test_mode {
        tracing::warn!("test mode: using a shared in-memory database");
        HandleProvider::shared_in_memory().await?
    } else {
        HandleProvider::per_request(&config.data_dir).await?
    };
    let state = AppState { provider };

    let app = api_routes(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
