use crate::core::compliance::is_valid_gstin;
use crate::core::{ConfigProvider, LedgerFormat};
use crate::domain::fiscal_year::FiscalYear;
use crate::utils::error::{GstError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_required_field, Validate,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

const DEFAULT_BUNDLE: &str = "gst_report.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub business: BusinessConfig,
    pub period: Option<PeriodConfig>,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    pub name: String,
    pub gstin: Option<String>,
    pub fiscal_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub ledger_path: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub bundle_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GstError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GstError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${VAR}` is replaced from the environment; unknown variables are left untouched.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("business.name", &self.business.name)?;
        FiscalYear::parse(&self.business.fiscal_year)?;

        if let Some(gstin) = &self.business.gstin {
            if !is_valid_gstin(gstin) {
                return Err(GstError::InvalidConfigValueError {
                    field: "business.gstin".to_string(),
                    value: gstin.clone(),
                    reason: "Invalid GSTIN format".to_string(),
                });
            }
        }

        let ledger_path = validate_required_field("source.ledger_path", &self.source.ledger_path)?;
        validate_path("source.ledger_path", ledger_path)?;
        if let Some(format) = &self.source.format {
            validate_one_of("source.format", std::slice::from_ref(format), &["csv", "json"])?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        validate_one_of("load.output_formats", &self.load.output_formats, &["csv", "json"])?;

        if let (Some(from), Some(to)) = (self.period_from(), self.period_to()) {
            if from > to {
                return Err(GstError::InvalidConfigValueError {
                    field: "period.from".to_string(),
                    value: from.to_string(),
                    reason: format!("must not be after period.to {}", to),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn business_name(&self) -> &str {
        &self.business.name
    }

    fn gstin(&self) -> Option<&str> {
        self.business.gstin.as_deref()
    }

    fn fiscal_year(&self) -> Result<FiscalYear> {
        FiscalYear::parse(&self.business.fiscal_year)
    }

    fn period_from(&self) -> Option<NaiveDate> {
        self.period.as_ref().and_then(|p| p.from)
    }

    fn period_to(&self) -> Option<NaiveDate> {
        self.period.as_ref().and_then(|p| p.to)
    }

    fn ledger_path(&self) -> &str {
        self.source.ledger_path.as_deref().unwrap_or_default()
    }

    fn ledger_format(&self) -> LedgerFormat {
        LedgerFormat::from_name_or_path(self.source.format.as_deref(), self.ledger_path())
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle_filename(&self) -> &str {
        self.load.bundle_filename.as_deref().unwrap_or(DEFAULT_BUNDLE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
