use mock_server::Auth;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let key = std::env::var("TRELLO_KEY").unwrap_or_else(|_| "test-key".to_string());
    let token = std::env::var("TRELLO_TOKEN").unwrap_or_else(|_| "test-token".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock api listening under /1/");
    mock_server::run(listener, Auth::new(key, token)).await
}
