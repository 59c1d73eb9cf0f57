use env_logger::Env;
use std::env;
use varugai::app;
use varugai::config::Config;

/// Main entry point for the registration web server
///
/// Configuration comes from the environment (see [`Config::load`]). An
/// optional first argument overrides the bind address.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let mut config = Config::load();

    let args: Vec<String> = env::args().collect();
    if let Some(address) = args.get(1) {
        config.bind_address = address.clone();
    }

    app::run(config).await
}
