use crate::domain::ports::SignalSink;
use crate::domain::signal::{Direction, Signal};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::error;

/// Appends signals to a CSV audit file.
///
/// Actionable signals are always recorded, Hold outcomes only when
/// `audit_all` is set. The header is written once when the file is
/// created. Write failures are logged and never disturb the pipeline.
pub struct CsvAuditSink {
    output_path: PathBuf,
    audit_all: bool,
}

#[derive(Serialize)]
struct AuditRow {
    timestamp: String,
    symbol: String,
    timeframe: String,
    price: Decimal,
    rsi: Option<Decimal>,
    support: Option<Decimal>,
    resistance: Option<Decimal>,
    signal: String,
    entry: Option<Decimal>,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    session: String,
    stale: bool,
}

impl CsvAuditSink {
    pub fn new(output_path: PathBuf, audit_all: bool) -> Self {
        Self {
            output_path,
            audit_all,
        }
    }

    fn write_row(&self, row: &AuditRow) {
        let file_exists = self.output_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path);

        match file {
            Ok(f) => {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(!file_exists)
                    .from_writer(f);

                if let Err(e) = wtr.serialize(row) {
                    error!("CsvAuditSink: failed to serialize signal row: {}", e);
                }
                if let Err(e) = wtr.flush() {
                    error!("CsvAuditSink: failed to flush audit file: {}", e);
                }
            }
            Err(e) => {
                error!(
                    "CsvAuditSink: failed to open {}: {}",
                    self.output_path.display(),
                    e
                );
            }
        }
    }
}

impl SignalSink for CsvAuditSink {
    fn publish(&self, signal: &Signal) {
        if signal.direction == Direction::Hold && !self.audit_all {
            return;
        }

        let row = AuditRow {
            timestamp: signal.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            symbol: signal.symbol.clone(),
            timeframe: signal.timeframe.to_string(),
            price: signal.price,
            rsi: signal.rsi,
            support: signal.support,
            resistance: signal.resistance,
            signal: signal.direction.to_string(),
            entry: signal.entry,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            session: signal.session.to_string(),
            stale: signal.stale,
        };
        self.write_row(&row);
    }
}
