pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::*;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::core::compliance::is_valid_gstin;
    use crate::core::{ConfigProvider, LedgerFormat};
    use crate::domain::fiscal_year::FiscalYear;
    use crate::utils::error::{GstError, Result};
    use crate::utils::validation::{validate_non_empty_string, validate_one_of, validate_path, Validate};
    use chrono::NaiveDate;
    use clap::{Args, Parser, Subcommand};

    pub const OUTPUT_FORMATS: [&str; 2] = ["csv", "json"];
    pub const LEDGER_FORMATS: [&str; 2] = ["csv", "json"];

    #[derive(Debug, Clone, Parser)]
    #[command(name = "gsthive")]
    #[command(about = "GST summary, invoice numbering and compliance checks")]
    pub struct CliConfig {
        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Log as JSON lines")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Compute the GST summary for a period and write a report bundle
        Summary(SummaryArgs),
        /// Check sale invoices in a ledger against GST rules
        Validate(LedgerArgs),
        /// Print the next invoice number for a fiscal year
        NextNumber(NextNumberArgs),
    }

    #[derive(Debug, Clone, Args)]
    pub struct LedgerArgs {
        /// Ledger export (CSV or JSON)
        #[arg(long)]
        pub ledger: String,

        /// Ledger format; taken from the file extension when omitted
        #[arg(long)]
        pub ledger_format: Option<String>,
    }

    #[derive(Debug, Clone, Args)]
    pub struct SummaryArgs {
        #[command(flatten)]
        pub ledger: LedgerArgs,

        #[arg(long)]
        pub fiscal_year: String,

        /// First day of the period, defaults to 1 April
        #[arg(long)]
        pub from: Option<NaiveDate>,

        /// Last day of the period, defaults to 31 March
        #[arg(long)]
        pub to: Option<NaiveDate>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv,json")]
        pub format: Vec<String>,

        #[arg(long, default_value = "gst_report.zip")]
        pub bundle: String,

        #[arg(long, default_value = "Unnamed business")]
        pub business_name: String,

        #[arg(long)]
        pub gstin: Option<String>,
    }

    #[derive(Debug, Clone, Args)]
    pub struct NextNumberArgs {
        #[arg(long)]
        pub fiscal_year: String,

        /// Ledger whose sale invoice numbers are already taken
        #[arg(long)]
        pub ledger: Option<String>,

        #[arg(long)]
        pub ledger_format: Option<String>,
    }

    impl LedgerArgs {
        pub fn format(&self) -> LedgerFormat {
            LedgerFormat::from_name_or_path(self.ledger_format.as_deref(), &self.ledger)
        }
    }

    impl Validate for LedgerArgs {
        fn validate(&self) -> Result<()> {
            validate_path("ledger", &self.ledger)?;
            if let Some(format) = &self.ledger_format {
                validate_one_of("ledger_format", std::slice::from_ref(format), &LEDGER_FORMATS)?;
            }
            Ok(())
        }
    }

    impl Validate for SummaryArgs {
        fn validate(&self) -> Result<()> {
            self.ledger.validate()?;
            FiscalYear::parse(&self.fiscal_year)?;
            validate_path("output_path", &self.output_path)?;
            validate_path("bundle", &self.bundle)?;
            validate_one_of("format", &self.format, &OUTPUT_FORMATS)?;
            validate_non_empty_string("business_name", &self.business_name)?;

            if let Some(gstin) = &self.gstin {
                if !is_valid_gstin(gstin) {
                    return Err(GstError::InvalidConfigValueError {
                        field: "gstin".to_string(),
                        value: gstin.clone(),
                        reason: "Invalid GSTIN format".to_string(),
                    });
                }
            }

            if let (Some(from), Some(to)) = (self.from, self.to) {
                if from > to {
                    return Err(GstError::InvalidConfigValueError {
                        field: "from".to_string(),
                        value: from.to_string(),
                        reason: format!("must not be after --to {}", to),
                    });
                }
            }
            Ok(())
        }
    }

    impl ConfigProvider for SummaryArgs {
        fn business_name(&self) -> &str {
            &self.business_name
        }

        fn gstin(&self) -> Option<&str> {
            self.gstin.as_deref()
        }

        fn fiscal_year(&self) -> Result<FiscalYear> {
            FiscalYear::parse(&self.fiscal_year)
        }

        fn period_from(&self) -> Option<NaiveDate> {
            self.from
        }

        fn period_to(&self) -> Option<NaiveDate> {
            self.to
        }

        fn ledger_path(&self) -> &str {
            &self.ledger.ledger
        }

        fn ledger_format(&self) -> LedgerFormat {
            self.ledger.format()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.format
        }

        fn bundle_filename(&self) -> &str {
            &self.bundle
        }
    }

}
