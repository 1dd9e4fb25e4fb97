use clap::Parser;
use getaround_pricing::utils::error::ErrorSeverity;
use getaround_pricing::utils::{logger, validation::Validate};
use getaround_pricing::{DelayReportPipeline, EtlEngine, LocalStorage, ReportConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting delay report");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let source = LocalStorage::new(".".to_string());
    let sink = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(DelayReportPipeline::new(source, sink, config));

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Delay report completed");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Delay report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
