use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load. Fills the `period` and `net_payable` fields of the
    /// enclosing report span, if there is one.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting GST report...");

        tracing::info!("📥 Reading ledger...");
        let entries = self.pipeline.extract().await?;
        tracing::info!("Read {} ledger entries", entries.len());

        tracing::info!("🧮 Computing summary...");
        let report = self.pipeline.transform(entries).await?;
        let span = tracing::Span::current();
        let period = format!("{}..{}", report.period_from, report.period_to);
        span.record("period", period.as_str());
        span.record(
            "net_payable",
            tracing::field::display(report.summary.net_payable.total()),
        );
        tracing::info!(
            "Period {} to {}: {} entries, net payable {}, ITC carried forward {}",
            report.period_from,
            report.period_to,
            report.entries_in_period,
            report.summary.net_payable.total(),
            report.summary.accumulated_itc
        );

        tracing::info!("📦 Writing report bundle...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report written to {} in {:?}", output_path, started.elapsed());

        Ok(output_path)
    }
}
