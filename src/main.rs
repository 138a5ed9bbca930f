use fortigate_subnet_usage::config::Config;
use fortigate_subnet_usage::logging::{init_logging, LOG_CONFIG_FILE};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    init_logging(LOG_CONFIG_FILE)?;
    log::info!("#Start main()");

    let config = Config::from_env()?;
    fortigate_subnet_usage::run(config).await
}
