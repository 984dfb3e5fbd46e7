use crate::core::aggregate::{aggregate, ReportingPeriod};
use crate::core::compliance::validate_ledger;
use crate::core::ledger::load_ledger;
use crate::core::summary::{rounded, try_summarize};
use crate::core::{ConfigProvider, LedgerFormat, Pipeline, Storage};
use crate::domain::amount::{parse_amount, parse_flag};
use crate::domain::model::{ComplianceIssue, EntryKind, GstReport, LedgerEntry};
use crate::utils::error::{GstError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const SUMMARY_CSV: &str = "gst_summary.csv";
pub const SUMMARY_JSON: &str = "gst_summary.json";
pub const ISSUES_JSON: &str = "compliance_issues.json";

/// Reads a ledger export, computes the period summary and writes a report bundle.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn reporting_period(&self) -> Result<ReportingPeriod> {
        let fiscal_year = self.config.fiscal_year()?;
        let from = self.config.period_from().unwrap_or_else(|| fiscal_year.start_date());
        let to = self.config.period_to().unwrap_or_else(|| fiscal_year.end_date());
        ReportingPeriod::new(from, to)
    }

    fn wants(&self, format: &str) -> bool {
        let formats = self.config.output_formats();
        formats.is_empty() || formats.iter().any(|f| f == format)
    }
}

/// A CSV ledger row before its amount cells are parsed.
///
/// The csv crate infers numeric cells as `f64` and rejects blank ones, so amounts and the
/// reverse-charge flag are read as text here.
#[derive(Debug, Deserialize)]
struct CsvLedgerRow {
    kind: EntryKind,
    number: String,
    date: NaiveDate,
    #[serde(default)]
    counterparty_gstin: Option<String>,
    #[serde(default)]
    place_of_supply: Option<String>,
    #[serde(default)]
    service_code: Option<String>,
    #[serde(default)]
    igst_rate: String,
    #[serde(default)]
    igst: String,
    #[serde(default)]
    cgst: String,
    #[serde(default)]
    sgst: String,
    #[serde(default)]
    reverse_charge: String,
    #[serde(default)]
    lut_number: Option<String>,
    #[serde(default)]
    lut_date: Option<NaiveDate>,
}

impl CsvLedgerRow {
    fn into_entry(self, record: usize) -> Result<LedgerEntry> {
        let invalid = |column: &str, value: &str, reason: String| GstError::ProcessingError {
            message: format!(
                "Ledger record {} ({}): invalid {} {:?}: {}",
                record, self.number, column, value, reason
            ),
        };
        let amount = |column: &str, value: &str| {
            parse_amount(value).map_err(|e| invalid(column, value, e.to_string()))
        };

        let igst_rate = amount("igst_rate", &self.igst_rate)?;
        let igst = amount("igst", &self.igst)?;
        let cgst = amount("cgst", &self.cgst)?;
        let sgst = amount("sgst", &self.sgst)?;
        let reverse_charge = parse_flag(&self.reverse_charge).ok_or_else(|| {
            invalid(
                "reverse_charge",
                &self.reverse_charge,
                "expected true/false, yes/no or 1/0".to_string(),
            )
        })?;

        Ok(LedgerEntry {
            kind: self.kind,
            number: self.number,
            date: self.date,
            counterparty_gstin: self.counterparty_gstin,
            place_of_supply: self.place_of_supply,
            service_code: self.service_code,
            igst_rate,
            igst,
            cgst,
            sgst,
            reverse_charge,
            lut_number: self.lut_number,
            lut_date: self.lut_date,
        })
    }
}

pub fn parse_ledger(data: &[u8], format: LedgerFormat) -> Result<Vec<LedgerEntry>> {
    match format {
        LedgerFormat::Json => Ok(serde_json::from_slice(data)?),
        LedgerFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(data);
            let mut entries = Vec::new();
            for (index, row) in reader.deserialize::<CsvLedgerRow>().enumerate() {
                entries.push(row?.into_entry(index + 1)?);
            }
            Ok(entries)
        }
    }
}

/// One row per head plus a total row, amounts rounded to the rupee.
pub fn render_summary_csv(report: &GstReport) -> Result<String> {
    let summary = &report.summary;
    let columns = [
        rounded(&summary.output_liability),
        rounded(&summary.itc_available),
        rounded(&summary.rcm_liability),
        rounded(&summary.net_payable),
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "head",
        "output_liability",
        "itc_available",
        "rcm_liability",
        "net_payable",
    ])?;
    for (row, head) in ["IGST", "CGST", "SGST", "TOTAL"].iter().enumerate() {
        writer.write_record([
            head.to_string(),
            columns[0][row].to_string(),
            columns[1][row].to_string(),
            columns[2][row].to_string(),
            columns[3][row].to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| GstError::ProcessingError {
        message: format!("Failed to flush summary CSV: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| GstError::ProcessingError {
        message: format!("Summary CSV is not UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<LedgerEntry>> {
        let path = self.config.ledger_path();
        tracing::debug!("Reading ledger from: {}", path);

        let entries = load_ledger(&self.storage, path, self.config.ledger_format()).await?;

        if entries.is_empty() {
            tracing::warn!("Ledger {} has no entries", path);
        }
        Ok(entries)
    }

    async fn transform(&self, entries: Vec<LedgerEntry>) -> Result<GstReport> {
        let fiscal_year = self.config.fiscal_year()?;
        let period = self.reporting_period()?;
        tracing::debug!("Reporting period: {}", period.label());

        let in_period: Vec<LedgerEntry> = entries
            .into_iter()
            .filter(|entry| period.contains(entry.date))
            .collect();

        let compliance_issues: Vec<ComplianceIssue> = validate_ledger(&in_period)
            .into_iter()
            .map(|(invoice_number, result)| ComplianceIssue {
                invoice_number,
                errors: result.messages(),
            })
            .collect();
        if !compliance_issues.is_empty() {
            tracing::warn!(
                "{} sale invoices failed GST compliance checks",
                compliance_issues.len()
            );
        }

        let input = aggregate(&in_period, &period)?;
        let summary = try_summarize(&input)?;

        Ok(GstReport {
            business_name: self.config.business_name().to_string(),
            gstin: self.config.gstin().map(str::to_string),
            fiscal_year: fiscal_year.to_string(),
            period_from: period.from(),
            period_to: period.to(),
            entries_in_period: in_period.len(),
            input,
            summary,
            compliance_issues,
        })
    }

    async fn load(&self, report: GstReport) -> Result<String> {
        let bundle_path = Path::new(self.config.output_path())
            .join(self.config.bundle_filename())
            .to_string_lossy()
            .into_owned();

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            if self.wants("csv") {
                zip.start_file::<_, ()>(SUMMARY_CSV, FileOptions::default())?;
                zip.write_all(render_summary_csv(&report)?.as_bytes())?;
            }

            if self.wants("json") {
                zip.start_file::<_, ()>(SUMMARY_JSON, FileOptions::default())?;
                let json_data = serde_json::to_string_pretty(&report)?;
                zip.write_all(json_data.as_bytes())?;
            }

            if !report.compliance_issues.is_empty() {
                zip.start_file::<_, ()>(ISSUES_JSON, FileOptions::default())?;
                let json_data = serde_json::to_string_pretty(&report.compliance_issues)?;
                zip.write_all(json_data.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report bundle ({} bytes) to {}", zip_data.len(), bundle_path);
        self.storage.write_file(&bundle_path, &zip_data).await?;

        Ok(bundle_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fiscal_year::FiscalYear;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                GstError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        period_from: Option<NaiveDate>,
        period_to: Option<NaiveDate>,
        formats: Vec<String>,
    }

    impl ConfigProvider for TestConfig {
        fn business_name(&self) -> &str {
            "Acme Exports"
        }
        fn gstin(&self) -> Option<&str> {
            Some("29ABCDE1234F1Z5")
        }
        fn fiscal_year(&self) -> Result<FiscalYear> {
            FiscalYear::parse("2025-26")
        }
        fn period_from(&self) -> Option<NaiveDate> {
            self.period_from
        }
        fn period_to(&self) -> Option<NaiveDate> {
            self.period_to
        }
        fn ledger_path(&self) -> &str {
            "ledger.csv"
        }
        fn ledger_format(&self) -> LedgerFormat {
            LedgerFormat::Csv
        }
        fn output_path(&self) -> &str {
            "out"
        }
        fn output_formats(&self) -> &[String] {
            &self.formats
        }
        fn bundle_filename(&self) -> &str {
            "gst_report.zip"
        }
    }

    const LEDGER: &str = "\
kind,number,date,counterparty_gstin,place_of_supply,service_code,igst_rate,igst,cgst,sgst,reverse_charge
sale,FY25-26/001,2025-04-05,29ABCDE1234F1Z5,Karnataka,,18,1000,0,0,false
sale,FY25-26/002,2025-05-12,,Outside India,1234567,0,0,0,0,false
purchase,B-77,2025-05-20,27PQRSX5678K1Z2,Maharashtra,,18,200,0,0,false
purchase,RCM-3,2025-06-01,,Karnataka,,0,100,0,0,true
sale,FY24-25/310,2025-03-28,,Karnataka,,0,0,900,900,false
";

    fn pipeline(formats: &[&str]) -> (ReportPipeline<MockStorage, TestConfig>, MockStorage) {
        let storage = MockStorage::with_file("ledger.csv", LEDGER.as_bytes());
        let config = TestConfig {
            period_from: None,
            period_to: None,
            formats: formats.iter().map(|f| f.to_string()).collect(),
        };
        (ReportPipeline::new(storage.clone(), config), storage)
    }

    #[test]
    fn test_parse_csv_ledger() {
        let entries = parse_ledger(LEDGER.as_bytes(), LedgerFormat::Csv).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].kind, EntryKind::Sale);
        assert_eq!(entries[0].igst, dec!(1000));
        assert_eq!(entries[1].counterparty_gstin, None);
        assert!(entries[3].reverse_charge);
    }

    #[test]
    fn test_parse_csv_ledger_blank_cells() {
        let csv = "\
kind,number,date,counterparty_gstin,place_of_supply,service_code,igst_rate,igst,cgst,sgst,reverse_charge
sale,FY25-26/001,2025-04-05,,Karnataka,,,1000,,,
purchase,RCM-9,2025-04-06,,Karnataka,,, ,45,45,yes
";
        let entries = parse_ledger(csv.as_bytes(), LedgerFormat::Csv).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].igst, dec!(1000));
        assert_eq!(entries[0].igst_rate, Decimal::ZERO);
        assert_eq!(entries[0].cgst, Decimal::ZERO);
        assert_eq!(entries[0].sgst, Decimal::ZERO);
        assert!(!entries[0].reverse_charge);
        assert_eq!(entries[1].igst, Decimal::ZERO);
        assert_eq!(entries[1].tax().total(), dec!(90));
        assert!(entries[1].reverse_charge);
    }

    #[test]
    fn test_parse_ledger_keeps_full_precision() {
        let csv = "\
kind,number,date,igst,cgst,sgst
sale,FY25-26/001,2025-04-05,1234567890123456.78,0.01,0.01
";
        let entries = parse_ledger(csv.as_bytes(), LedgerFormat::Csv).unwrap();
        assert_eq!(entries[0].igst, dec!(1234567890123456.78));
        assert_eq!(entries[0].tax().total(), dec!(1234567890123456.80));

        let json = r#"[{"kind": "sale", "number": "FY25-26/001", "date": "2025-04-05",
                        "igst": 1234567890123456.78}]"#;
        let entries = parse_ledger(json.as_bytes(), LedgerFormat::Json).unwrap();
        assert_eq!(entries[0].igst, dec!(1234567890123456.78));
    }

    #[test]
    fn test_parse_csv_ledger_rejects_bad_amount() {
        let csv = "\
kind,number,date,igst,reverse_charge
sale,FY25-26/001,2025-04-05,1000,false
sale,FY25-26/002,2025-04-06,12O0,false
";
        let err = parse_ledger(csv.as_bytes(), LedgerFormat::Csv).unwrap_err();
        assert!(matches!(err, GstError::ProcessingError { .. }));
        let message = err.to_string();
        assert!(message.contains("record 2"), "{}", message);
        assert!(message.contains("FY25-26/002"), "{}", message);
        assert!(message.contains("igst"), "{}", message);

        let csv = "kind,number,date,reverse_charge\npurchase,B-1,2025-04-06,maybe\n";
        assert!(parse_ledger(csv.as_bytes(), LedgerFormat::Csv).is_err());
    }

    #[tokio::test]
    async fn test_transform_summarizes_fiscal_year() {
        let (pipeline, _) = pipeline(&["csv", "json"]);
        let entries = pipeline.extract().await.unwrap();
        let report = pipeline.transform(entries).await.unwrap();

        assert_eq!(report.entries_in_period, 4);
        assert_eq!(report.summary.output_liability.total(), dec!(1000));
        assert_eq!(report.summary.itc_available.igst(), dec!(300));
        assert_eq!(report.summary.rcm_liability.igst(), dec!(100));
        assert_eq!(report.summary.net_payable.total(), dec!(700));
        assert_eq!(report.summary.accumulated_itc, dec!(0));

        assert_eq!(report.compliance_issues.len(), 1);
        assert_eq!(report.compliance_issues[0].invoice_number, "FY25-26/002");
        assert_eq!(
            report.compliance_issues[0].errors,
            vec![
                "Service code must be 8 digits for exports".to_string(),
                "Place of supply must include Section 2-6 reference for exports".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_writes_bundle() {
        let (pipeline, storage) = pipeline(&["csv"]);
        let entries = pipeline.extract().await.unwrap();
        let report = pipeline.transform(entries).await.unwrap();
        let path = pipeline.load(report).await.unwrap();

        assert!(path.ends_with("gst_report.zip"));
        let data = storage.get_file(&path).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&SUMMARY_CSV.to_string()));
        assert!(names.contains(&ISSUES_JSON.to_string()));
        assert!(!names.contains(&SUMMARY_JSON.to_string()));

        let mut csv_file = archive.by_name(SUMMARY_CSV).unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut csv_file, &mut content).unwrap();
        assert!(content.starts_with("head,output_liability,itc_available,rcm_liability,net_payable"));
        assert!(content.contains("IGST,1000,300,100,700"));
        assert!(content.contains("TOTAL,1000,300,100,700"));
    }

    #[tokio::test]
    async fn test_period_override() {
        let storage = MockStorage::with_file("ledger.csv", LEDGER.as_bytes());
        let config = TestConfig {
            period_from: Some("2025-05-01".parse().unwrap()),
            period_to: Some("2025-05-31".parse().unwrap()),
            formats: vec![],
        };
        let pipeline = ReportPipeline::new(storage, config);

        let entries = pipeline.extract().await.unwrap();
        let report = pipeline.transform(entries).await.unwrap();

        assert_eq!(report.entries_in_period, 2);
        assert_eq!(report.summary.net_payable.total(), dec!(-200));
        assert_eq!(report.summary.accumulated_itc, dec!(200));
    }

    #[tokio::test]
    async fn test_missing_ledger_is_io_error() {
        let storage = MockStorage {
            files: Arc::new(Mutex::new(HashMap::new())),
        };
        let config = TestConfig {
            period_from: None,
            period_to: None,
            formats: vec![],
        };
        let pipeline = ReportPipeline::new(storage, config);
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, GstError::IoError(_)));
    }
}
