use thiserror::Error;

#[derive(Error, Debug)]
pub enum GstError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid fiscal year '{value}': {reason}")]
    FiscalYearError { value: String, reason: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl GstError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GstError::ZipError(_) | GstError::IoError(_) => ErrorCategory::Io,
            GstError::CsvError(_)
            | GstError::SerializationError(_)
            | GstError::ProcessingError { .. } => ErrorCategory::Data,
            GstError::ConfigValidationError { .. }
            | GstError::InvalidConfigValueError { .. }
            | GstError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GstError::FiscalYearError { .. } | GstError::ValidationError { .. } => {
                ErrorCategory::Validation
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GstError::IoError(_) | GstError::ZipError(_) => ErrorSeverity::Medium,
            GstError::CsvError(_)
            | GstError::SerializationError(_)
            | GstError::ProcessingError { .. }
            | GstError::FiscalYearError { .. }
            | GstError::ValidationError { .. } => ErrorSeverity::High,
            GstError::ConfigValidationError { .. }
            | GstError::InvalidConfigValueError { .. }
            | GstError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GstError::IoError(_) => {
                "Check that the ledger file exists and the output directory is writable".to_string()
            }
            GstError::ZipError(_) => "Check free disk space and retry the export".to_string(),
            GstError::CsvError(_) => {
                "Check the ledger CSV header: kind,number,date,igst_rate,igst,cgst,sgst,reverse_charge"
                    .to_string()
            }
            GstError::SerializationError(_) => {
                "Check that the ledger JSON is an array of entries".to_string()
            }
            GstError::FiscalYearError { .. } => {
                "Use the YYYY-YY form, e.g. 2025-26".to_string()
            }
            GstError::ConfigValidationError { field, .. }
            | GstError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting and run again", field)
            }
            GstError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            GstError::ProcessingError { .. } => {
                "Inspect the ledger entries for inconsistent amounts".to_string()
            }
            GstError::ValidationError { .. } => {
                "Review the reported invoices before filing".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Data => format!("The ledger could not be processed: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
            ErrorCategory::Validation => format!("Input rejected: {}", self),
        }
    }

    /// Process exit code for the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, GstError>;
