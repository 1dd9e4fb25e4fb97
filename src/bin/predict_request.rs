use clap::Parser;
use getaround_pricing::client::PricingClient;
use getaround_pricing::utils::{logger, validation::Validate};
use getaround_pricing::{CarFeatures, ClientConfig};
use std::time::Duration;

fn load_car(path: Option<&str>) -> anyhow::Result<CarFeatures> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(CarFeatures::sample()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::parse();
    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let car = load_car(config.payload.as_deref())?;
    tracing::debug!("Payload: {:?}", car);

    let client = PricingClient::new(&config.url, Duration::from_secs(config.timeout_seconds))?;
    match client.predict(&car).await {
        Ok(response) => {
            println!("Estimated price: {}", serde_json::to_string(&response)?);
        }
        Err(e) => {
            tracing::error!("Request to {} failed: {}", client.endpoint(), e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    }

    Ok(())
}
