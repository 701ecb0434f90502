use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pendula_core::ClientConfig;
use pendula_net::WsTransport;
use pendula_ui::run_ui;

const DEFAULT_CONFIG: &str = "pendula.toml";

fn main() {
    // Init logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Pendula starting");
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = match ClientConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Pendula error: {e}");
            std::process::exit(1);
        }
    };

    let transport = WsTransport::connect(config.transport.clone());
    if let Err(e) = run_ui(config, Box::new(transport)) {
        error!("Pendula error: {e}");
        std::process::exit(1);
    }
}
