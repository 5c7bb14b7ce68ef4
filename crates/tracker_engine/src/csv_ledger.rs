use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracker_core::ApplicationStatus;
use tracker_logging::tracker_info;

use crate::ledger::{LedgerColumn, LedgerError, LedgerRow, LedgerStore, RowId, ScannedRow};
use crate::persist::AtomicFileWriter;

/// Ledger kept in a CSV file with a header row. Every mutation rewrites the
/// file atomically.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    writer: AtomicFileWriter,
}

impl CsvLedger {
    /// Opens `path`, creating it with just the header row when missing.
    pub fn open(path: PathBuf) -> Result<Self, LedgerError> {
        let ledger = Self {
            writer: AtomicFileWriter::new(path),
        };
        if !ledger.path().exists() {
            ledger.write_records(&[])?;
            tracker_info!("Created ledger {:?}", ledger.path());
        }
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    fn read_records(&self) -> Result<Vec<Vec<String>>, LedgerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(self.path())?;
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok(records)
    }

    fn write_records(&self, records: &[Vec<String>]) -> Result<(), LedgerError> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        wtr.write_record(LedgerColumn::ALL.iter().map(|c| c.header()))?;
        for record in records {
            wtr.write_record(record)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|err| LedgerError::Unavailable(err.to_string()))?;
        self.writer.write(&bytes)?;
        Ok(())
    }
}

fn cell(record: &[String], column: LedgerColumn) -> &str {
    record
        .get(column.index())
        .map(String::as_str)
        .unwrap_or_default()
}

fn parse_row(record: &[String]) -> Result<LedgerRow, String> {
    let status = cell(record, LedgerColumn::Status)
        .parse::<ApplicationStatus>()
        .map_err(|err| err.to_string())?;
    let applied_on = NaiveDate::parse_from_str(cell(record, LedgerColumn::AppliedOn), "%Y-%m-%d")
        .map_err(|err| format!("applied date: {err}"))?;
    let last_updated = DateTime::parse_from_rfc3339(cell(record, LedgerColumn::LastUpdated))
        .map_err(|err| format!("last updated: {err}"))?
        .with_timezone(&Utc);

    Ok(LedgerRow {
        company: cell(record, LedgerColumn::Company).to_string(),
        title: cell(record, LedgerColumn::Title).to_string(),
        url: cell(record, LedgerColumn::Url).to_string(),
        status,
        applied_on,
        last_updated,
    })
}

#[async_trait::async_trait]
impl LedgerStore for CsvLedger {
    async fn append_row(&self, row: LedgerRow) -> Result<(), LedgerError> {
        let mut records = self.read_records()?;
        records.push(row.cells().to_vec());
        self.write_records(&records)
    }

    async fn scan_rows(&self) -> Result<Vec<(RowId, ScannedRow)>, LedgerError> {
        let rows = self
            .read_records()?
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let id = RowId(idx);
                let scanned = match parse_row(record) {
                    Ok(row) => ScannedRow::Valid(row),
                    Err(reason) => ScannedRow::Malformed {
                        company: cell(record, LedgerColumn::Company).to_string(),
                        title: cell(record, LedgerColumn::Title).to_string(),
                        reason,
                    },
                };
                (id, scanned)
            })
            .collect();
        Ok(rows)
    }

    async fn update_cell(
        &self,
        row: RowId,
        column: LedgerColumn,
        value: String,
    ) -> Result<(), LedgerError> {
        let mut records = self.read_records()?;
        let record = records.get_mut(row.0).ok_or(LedgerError::UnknownRow(row))?;
        if record.len() < LedgerColumn::ALL.len() {
            record.resize(LedgerColumn::ALL.len(), String::new());
        }
        record[column.index()] = value;
        self.write_records(&records)
    }
}
