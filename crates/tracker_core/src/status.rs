use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical application status as stored in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Initial status of every freshly recorded application.
    Applied,
    Interview,
    Rejected,
    Offer,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Strict parse of the ledger spelling. Free-form text goes through
    /// [`normalize_status`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Applied" => Ok(ApplicationStatus::Applied),
            "Interview" => Ok(ApplicationStatus::Interview),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            "Offer" => Ok(ApplicationStatus::Offer),
            "Withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Ordered keyword table. The first row with a matching keyword wins.
const STATUS_PATTERNS: &[(&[&str], ApplicationStatus)] = &[
    (&["regret", "unfortunately", "sorry"], ApplicationStatus::Rejected),
    (&["interview"], ApplicationStatus::Interview),
    (&["offer"], ApplicationStatus::Offer),
    (&["withdraw"], ApplicationStatus::Withdrawn),
];

/// Maps free-form status text reported by the model to a canonical status.
///
/// Matching is a case-insensitive substring test in fixed priority order:
/// rejection wording, then interview, offer, withdrawal. Anything else,
/// including empty text, falls back to [`ApplicationStatus::Rejected`].
/// Never returns [`ApplicationStatus::Applied`].
pub fn normalize_status(raw: &str) -> ApplicationStatus {
    let lowered = raw.to_lowercase();
    STATUS_PATTERNS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(_, status)| *status)
        .unwrap_or(ApplicationStatus::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_spelling_parses_back() {
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::Interview,
            ApplicationStatus::Rejected,
            ApplicationStatus::Offer,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("applied".parse::<ApplicationStatus>().is_err());
    }
}
