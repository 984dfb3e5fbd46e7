use crate::domain::fiscal_year::FiscalYear;
use crate::domain::model::{GstReport, LedgerEntry};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    Csv,
    Json,
}

impl LedgerFormat {
    /// Falls back to the file extension when no format is configured.
    pub fn from_name_or_path(name: Option<&str>, path: &str) -> Self {
        let name = name.map(str::to_ascii_lowercase).or_else(|| {
            std::path::Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        });
        match name.as_deref() {
            Some("json") => LedgerFormat::Json,
            _ => LedgerFormat::Csv,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn business_name(&self) -> &str;
    fn gstin(&self) -> Option<&str>;
    fn fiscal_year(&self) -> Result<FiscalYear>;
    fn period_from(&self) -> Option<NaiveDate>;
    fn period_to(&self) -> Option<NaiveDate>;
    fn ledger_path(&self) -> &str;
    fn ledger_format(&self) -> LedgerFormat;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_filename(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<LedgerEntry>>;
    async fn transform(&self, entries: Vec<LedgerEntry>) -> Result<GstReport>;
    async fn load(&self, report: GstReport) -> Result<String>;
}
