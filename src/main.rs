use clap::Parser;
use gsthive::config::{Command, LedgerArgs, NextNumberArgs, SummaryArgs};
use gsthive::core::ConfigProvider;
use gsthive::utils::logger::{self, LogFormat};
use gsthive::utils::validation::Validate;
use gsthive::{
    check_ledger, load_ledger, next_sale_number, CliConfig, LocalStorage, ReportEngine,
    ReportPipeline,
};
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let format = if config.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let outcome = match config.command {
        Command::Summary(args) => run_summary(args).await,
        Command::Validate(args) => run_validate(args).await,
        Command::NextNumber(args) => run_next_number(args).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run_summary(args: SummaryArgs) -> gsthive::Result<()> {
    args.validate()?;

    let span = logger::report_span(args.business_name(), &args.fiscal_year);
    let storage = LocalStorage::new(".");
    let pipeline = ReportPipeline::new(storage, args);
    let engine = ReportEngine::new(pipeline);

    let output_path = engine.run().instrument(span).await?;
    println!("✅ GST report written to {}", output_path);
    Ok(())
}

async fn read_ledger(args: &LedgerArgs) -> gsthive::Result<Vec<gsthive::LedgerEntry>> {
    args.validate()?;
    load_ledger(&LocalStorage::new("."), &args.ledger, args.format()).await
}

async fn run_validate(args: LedgerArgs) -> gsthive::Result<()> {
    let entries = read_ledger(&args).await?;
    let check = check_ledger(&entries);

    for (number, result) in &check.failures {
        for message in result.messages() {
            println!("{}: {}", number, message);
        }
    }

    let sales = check.into_result()?;
    println!("✅ {} sale invoices passed GST checks", sales);
    Ok(())
}

async fn run_next_number(args: NextNumberArgs) -> gsthive::Result<()> {
    let entries = match &args.ledger {
        Some(ledger) => {
            read_ledger(&LedgerArgs {
                ledger: ledger.clone(),
                ledger_format: args.ledger_format.clone(),
            })
            .await?
        }
        None => Vec::new(),
    };

    println!("{}", next_sale_number(&args.fiscal_year, &entries)?);
    Ok(())
}
