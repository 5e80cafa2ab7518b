mod api;
mod config;
mod errors;
mod logging;
mod models;
mod resolver;
mod session;
mod trending;
#[cfg(test)]
mod test_support;

use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    let _log_guard = logging::init(config.log_dir.as_deref());

    info!(
        primary = config.primary.url(),
        fallback = config.fallback.url(),
        max_attempts = config.max_attempts,
        retry_delay_ms = config.retry_delay.as_millis() as u64,
        "Starting trending client"
    );

    let bind_addr = config.bind_addr;
    let session = session::Session::new(config);
    session.start_resolution();

    let app = api::create_router(session);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "Session API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
