use gsthive::core::{LedgerFormat, Pipeline};
use gsthive::{
    check_ledger, load_ledger, next_sale_number, GstError, LocalStorage, ReportPipeline,
    TomlConfig,
};
use rust_decimal_macros::dec;
use tempfile::TempDir;

// Spreadsheet export: blank tax cells and a blank reverse-charge flag.
const LEDGER_CSV: &str = "\
kind,number,date,counterparty_gstin,place_of_supply,service_code,igst_rate,igst,cgst,sgst,reverse_charge
sale,FY25-26/001,2025-04-05,29ABCDE1234F1Z5,Karnataka,,,1234567890123456.78,,,
sale,FY25-26/002,2025-04-11,,Outside India,998811,18,90,,,
purchase,PB-1001,2025-04-20,27PQRSX5678K1Z2,Maharashtra,,18,0.01,,,
purchase,RCM-4,2025-04-28,,Karnataka,,,,4.5,4.5,yes
";

fn write_ledger(dir: &TempDir) -> LocalStorage {
    std::fs::write(dir.path().join("ledger.csv"), LEDGER_CSV).unwrap();
    LocalStorage::new(dir.path())
}

#[tokio::test]
async fn test_validate_command_fails_on_bad_sales() {
    let temp_dir = TempDir::new().unwrap();
    let storage = write_ledger(&temp_dir);

    let entries = load_ledger(&storage, "ledger.csv", LedgerFormat::Csv)
        .await
        .unwrap();
    assert_eq!(entries.len(), 4);

    let check = check_ledger(&entries);
    assert_eq!(check.sales, 2);
    assert_eq!(check.failures.len(), 1);
    assert_eq!(check.failures[0].0, "FY25-26/002");
    assert_eq!(
        check.failures[0].1.messages(),
        vec![
            "Service code must be 8 digits for exports".to_string(),
            "Place of supply must include Section 2-6 reference for exports".to_string(),
        ]
    );

    let err = check.into_result().unwrap_err();
    assert!(matches!(err, GstError::ValidationError { .. }));
    assert_ne!(err.exit_code(), 0);
}

#[tokio::test]
async fn test_next_number_command_reads_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let storage = write_ledger(&temp_dir);

    let entries = load_ledger(&storage, "ledger.csv", LedgerFormat::Csv)
        .await
        .unwrap();
    assert_eq!(next_sale_number("2025-26", &entries).unwrap(), "FY25-26/003");
    assert_eq!(next_sale_number("2025-26", &[]).unwrap(), "FY25-26/001");
}

#[tokio::test]
async fn test_report_totals_are_exact() {
    let temp_dir = TempDir::new().unwrap();
    write_ledger(&temp_dir);

    let root = temp_dir.path().to_string_lossy().replace('\\', "/");
    let config = TomlConfig::from_toml_str(&format!(
        r#"
[business]
name = "Acme Exports"
fiscal_year = "2025-26"

[source]
ledger_path = "{root}/ledger.csv"

[load]
output_path = "{root}/reports"
output_formats = ["json"]
"#
    ))
    .unwrap();
    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config);

    let entries = pipeline.extract().await.unwrap();
    let report = pipeline.transform(entries).await.unwrap();
    let summary = report.summary;

    assert_eq!(
        summary.output_liability.total(),
        dec!(1234567890123546.78)
    );
    assert_eq!(summary.itc_available.total(), dec!(9.01));
    assert_eq!(summary.rcm_liability.cgst(), dec!(4.5));
    assert_eq!(summary.net_payable.total(), dec!(1234567890123537.77));

    let json = serde_json::to_value(&report.summary).unwrap();
    assert_eq!(json["net_payable"]["total"], "1234567890123537.77");
}
