use clap::Parser;
use gsthive::core::{ConfigProvider, Pipeline};
use gsthive::utils::logger::{self, LogFormat};
use gsthive::utils::validation::Validate;
use gsthive::{LocalStorage, ReportEngine, ReportPipeline, TomlConfig};
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "GST report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "gst-report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the fiscal year from config
    #[arg(long)]
    fiscal_year: Option<String>,

    /// Dry run - compute and print the summary without writing the bundle
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let format = if config.json_logs() {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, args.verbose || config.monitoring_enabled());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(fiscal_year) = args.fiscal_year {
        tracing::info!("🔧 Fiscal year overridden to: {}", fiscal_year);
        config.business.fiscal_year = fiscal_year;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    let span = logger::report_span(config.business_name(), &config.business.fiscal_year);
    let storage = LocalStorage::new(".");
    let pipeline = ReportPipeline::new(storage, config);

    if args.dry_run {
        let report = async {
            tracing::info!("🔍 DRY RUN MODE - the report bundle will not be written");
            let entries = pipeline.extract().await?;
            pipeline.transform(entries).await
        }
        .instrument(span)
        .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let engine = ReportEngine::new(pipeline);
    match engine.run().instrument(span).await {
        Ok(output_path) => {
            println!("✅ GST report written to {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Business: {}", config.business_name());
    if let Some(gstin) = config.gstin() {
        tracing::info!("   GSTIN: {}", gstin);
    }
    tracing::info!("   Fiscal year: {}", config.business.fiscal_year);
    match (config.period_from(), config.period_to()) {
        (None, None) => tracing::info!("   Period: full fiscal year"),
        (from, to) => tracing::info!("   Period: {:?} to {:?}", from, to),
    }
    tracing::info!("   Ledger: {} ({:?})", config.ledger_path(), config.ledger_format());
    tracing::info!("   Output: {}/{}", config.output_path(), config.bundle_filename());
    tracing::info!("   Formats: {}", config.output_formats().join(", "));
}
