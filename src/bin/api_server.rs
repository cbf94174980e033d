use clap::Parser;
use tracing::info;

use cogserv::api::{create_router, AppState};
use cogserv::{logging, ServerConfig};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();
    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("Logging already initialized: {}", e);
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind address");

    info!(
        bind = %config.bind,
        data_root = %config.data_root.display(),
        timeout_secs = config.request_timeout_secs,
        "cogserv listening"
    );
    info!("GET /cogserv/<bucket>/<key>~/tile/<z>/<x>/<y>.<png|jpg|webp>");
    info!("GET /cogserv/<bucket>/<key>~/map.<png|jpg|webp>?width=<px>");
    info!("GET /cogserv/about");

    let app = create_router(AppState::new(config));
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
