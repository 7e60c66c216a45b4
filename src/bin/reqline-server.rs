use env_logger::Env;
use reqline::server::{self, AppState, Config};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let state = AppState::new(config.client()?);
    let listener = TcpListener::bind(config.addr()).await?;
    server::run(listener, state).await?;
    Ok(())
}
