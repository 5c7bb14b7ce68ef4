use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tracker_core::ApplicationStatus;
use tracker_logging::{tracker_info, tracker_warn};

use crate::clock::Clock;
use crate::persist::PersistError;

/// Position of a data row, top-down, starting at 0 below the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// Ledger columns, in sheet order A..F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerColumn {
    Company,
    Title,
    Url,
    Status,
    AppliedOn,
    LastUpdated,
}

impl LedgerColumn {
    pub const ALL: [LedgerColumn; 6] = [
        LedgerColumn::Company,
        LedgerColumn::Title,
        LedgerColumn::Url,
        LedgerColumn::Status,
        LedgerColumn::AppliedOn,
        LedgerColumn::LastUpdated,
    ];

    pub fn index(self) -> usize {
        match self {
            LedgerColumn::Company => 0,
            LedgerColumn::Title => 1,
            LedgerColumn::Url => 2,
            LedgerColumn::Status => 3,
            LedgerColumn::AppliedOn => 4,
            LedgerColumn::LastUpdated => 5,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            LedgerColumn::Company => "Company",
            LedgerColumn::Title => "Title",
            LedgerColumn::Url => "URL",
            LedgerColumn::Status => "Status",
            LedgerColumn::AppliedOn => "Applied",
            LedgerColumn::LastUpdated => "Last Updated",
        }
    }
}

/// One tracked application, keyed by (company, title). The key is not unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub company: String,
    pub title: String,
    pub url: String,
    pub status: ApplicationStatus,
    pub applied_on: NaiveDate,
    pub last_updated: DateTime<Utc>,
}

impl LedgerRow {
    /// Cell values in column order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.company.clone(),
            self.title.clone(),
            self.url.clone(),
            self.status.to_string(),
            format_date(self.applied_on),
            format_timestamp(self.last_updated),
        ]
    }

    pub fn matches(&self, company: &str, title: &str) -> bool {
        self.company == company && self.title == title
    }
}

/// A data row as read back from the store. Rows edited by hand may not parse;
/// their key cells are still usable for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedRow {
    Valid(LedgerRow),
    Malformed {
        company: String,
        title: String,
        reason: String,
    },
}

impl ScannedRow {
    pub fn matches(&self, company: &str, title: &str) -> bool {
        match self {
            ScannedRow::Valid(row) => row.matches(company, title),
            ScannedRow::Malformed {
                company: c,
                title: t,
                ..
            } => c == company && t == title,
        }
    }

    pub fn valid(&self) -> Option<&LedgerRow> {
        match self {
            ScannedRow::Valid(row) => Some(row),
            ScannedRow::Malformed { .. } => None,
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("no such ledger {0}")]
    UnknownRow(RowId),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// External tabular store of tracked applications.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append_row(&self, row: LedgerRow) -> Result<(), LedgerError>;

    /// Every data row, top-down, with a stable identity. A row that does not
    /// parse is reported as [`ScannedRow::Malformed`], not as an error.
    async fn scan_rows(&self) -> Result<Vec<(RowId, ScannedRow)>, LedgerError>;

    async fn update_cell(
        &self,
        row: RowId,
        column: LedgerColumn,
        value: String,
    ) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(RowId),
    NoMatch,
}

/// Applies classification decisions to the ledger.
pub struct LedgerSync {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl LedgerSync {
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Appends a row with status `Applied`. Not deduplicated: recording the same
    /// confirmation twice yields two rows.
    pub async fn record_new_application(
        &self,
        company: &str,
        title: &str,
        url: &str,
        observed: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let row = LedgerRow {
            company: company.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            status: ApplicationStatus::Applied,
            applied_on: observed.date_naive(),
            last_updated: self.clock.now(),
        };
        tracker_info!(
            "Recording application {} / {} applied {}",
            company,
            title,
            row.applied_on
        );
        self.store.append_row(row).await
    }

    /// Sets status and last-updated on the first row matching (company, title)
    /// exactly. Later duplicates are never touched; no match is a logged no-op.
    ///
    /// Only the key cells take part in matching, so malformed rows are skipped
    /// with a warning, and a malformed matching row is still updated.
    pub async fn update_status(
        &self,
        company: &str,
        title: &str,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, LedgerError> {
        let rows = self.store.scan_rows().await?;
        let mut matched = None;
        for (id, row) in &rows {
            if let ScannedRow::Malformed { reason, .. } = row {
                tracker_warn!("Ledger {} is malformed: {}", id, reason);
            }
            if row.matches(company, title) {
                matched = Some(*id);
                break;
            }
        }
        let Some(row_id) = matched else {
            tracker_warn!("No row for update: {}/{}", company, title);
            return Ok(UpdateOutcome::NoMatch);
        };

        let now = self.clock.now();
        self.store
            .update_cell(row_id, LedgerColumn::Status, status.to_string())
            .await?;
        self.store
            .update_cell(row_id, LedgerColumn::LastUpdated, format_timestamp(now))
            .await?;
        tracker_info!("Updated {} ({}/{}) to {}", row_id, company, title, status);
        Ok(UpdateOutcome::Updated(row_id))
    }
}
