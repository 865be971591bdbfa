use std::sync::Arc;

use salondesk::config::{config_path, config_schema, load_config};
use salondesk::startup;
use salondesk::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Could not render config schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let path = config_path();
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load config from '{}': {}", path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
