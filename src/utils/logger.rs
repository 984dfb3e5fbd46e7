//! Subscriber setup for both binaries.
//!
//! A report run executes inside [`report_span`]. The JSON format flattens each event and
//! attaches that span's fields, so every line names the business and fiscal year it belongs to.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    Compact,
    /// JSON lines on stdout, for scheduled runs whose output is shipped to a log store.
    Json,
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gsthive=debug,info"
    } else {
        "gsthive=info"
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry.with(json_layer(std::io::stdout)).init(),
    }
}

fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_writer(writer)
}

/// Span a report run executes in. `period` and `net_payable` are recorded once the summary
/// has been computed.
pub fn report_span(business_name: &str, fiscal_year: &str) -> tracing::Span {
    tracing::info_span!(
        "gst_report",
        business = %business_name,
        fiscal_year = %fiscal_year,
        period = tracing::field::Empty,
        net_payable = tracing::field::Empty,
    )
}
