use clap::Parser;
use getaround_pricing::api::server;
use getaround_pricing::config::toml_config::{LoadPolicy, ServiceConfig};
use getaround_pricing::utils::error::{ErrorSeverity, PricingError};
use getaround_pricing::utils::{logger, validation::Validate};
use getaround_pricing::ModelStore;

#[derive(Parser)]
#[command(name = "getaround-api")]
#[command(about = "Rental price prediction API for Getaround cars")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    workers: Option<usize>,

    /// Override the model artifact path from config
    #[arg(long)]
    model_path: Option<String>,

    /// startup | per_request
    #[arg(long)]
    load_policy: Option<LoadPolicy>,

    /// Reject categories the model was not fitted on
    #[arg(long)]
    strict_categories: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn exit_with(e: &PricingError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入配置
    let mut config = match &args.config {
        Some(path) => match ServiceConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => ServiceConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(workers) = args.workers {
        config.server.workers = Some(workers);
    }
    if let Some(model_path) = args.model_path {
        config.model.path = model_path;
    }
    if let Some(load_policy) = args.load_policy {
        config.model.load_policy = load_policy;
    }
    if args.strict_categories {
        config.model.strict_categories = true;
    }

    // 先驗證，日誌層級必須合法
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    logger::init_logger(args.verbose, &config.logging.level, config.logging.format);
    tracing::info!("🚗 Starting Getaround pricing API");
    tracing::debug!("Service config: {:?}", config);

    let store = match ModelStore::open(
        &config.model.path,
        config.model.load_policy,
        config.model.strict_categories,
    ) {
        Ok(store) => store,
        Err(e) => exit_with(&e),
    };

    server::run(&config, store).await?;
    tracing::info!("Server stopped");
    Ok(())
}
