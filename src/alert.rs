//! Alert construction and delivery.

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::aggregate::ScanFindings;
use crate::error::Result;

/// The structured alert emitted for a matching file.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub time: String,
    pub filename: String,
    pub yara_scan_results: ScanFindings,
}

/// Delivery transport for alerts.
///
/// The console sink is the default; production deployments substitute a
/// queue or HTTP transport without touching the builder.
pub trait AlertSink {
    fn send(&mut self, alert: &Alert) -> Result<()>;
}

/// Pretty-prints alerts as JSON to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn send(&mut self, alert: &Alert) -> Result<()> {
        println!("\n[!] Sending alert!");
        println!("{}", serde_json::to_string_pretty(alert)?);
        Ok(())
    }
}

/// Builds alerts from non-empty findings and hands them to a sink.
pub struct AlertBuilder<'a> {
    sink: &'a mut dyn AlertSink,
}

impl<'a> AlertBuilder<'a> {
    pub fn new(sink: &'a mut dyn AlertSink) -> Self {
        Self { sink }
    }

    /// Stamp `findings` with `time` and `filename` and send the alert.
    pub fn build_and_send(
        &mut self,
        time: DateTime<Local>,
        filename: &str,
        findings: ScanFindings,
    ) -> Result<()> {
        let alert = Alert {
            time: time.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            filename: filename.to_string(),
            yara_scan_results: findings,
        };
        info!("sending alert for {}", alert.filename);
        self.sink.send(&alert)
    }
}
