use quote_proxy::env::SystemEnv;
use quote_proxy::{ProxyConfig, serve};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProxyConfig::from_env(&SystemEnv);
    serve(config).await.expect("Server failed");
}
