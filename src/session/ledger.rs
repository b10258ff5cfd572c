//! Scan classifier: decide the disposition of one scanned identifier and
//! mutate the ledger / unregistered sequence accordingly.

use serde::Serialize;

use crate::roster::{normalize_id, Record, Roster};

/// Disposition of a single scan. Unmatched scans are normal classified
/// outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Registered,
    AlreadyScanned,
    Unregistered,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::AlreadyScanned => "already_scanned",
            Self::Unregistered => "unregistered",
        }
    }
}

fn record_matches(record: &Record, column: &str, id: &str) -> bool {
    record.get(column).map(|cell| cell.as_key()).as_deref() == Some(id)
}

/// Classify one scanned identifier against the roster and ledger.
///
/// Empty (after trimming) input is a no-op and returns `None`. Otherwise:
/// a ledger match is `AlreadyScanned` (no mutation); a roster match is
/// `Registered` and appends the first matching roster record to the ledger
/// (first match wins when the roster carries duplicate identifier values);
/// anything else is `Unregistered` and inserts the id into `unregistered`
/// unless already present.
pub fn record_scan(
    raw_id: &str,
    roster: &Roster,
    column: &str,
    ledger: &mut Vec<Record>,
    unregistered: &mut Vec<String>,
) -> Option<ScanOutcome> {
    let id = normalize_id(raw_id);
    if id.is_empty() {
        return None;
    }

    if ledger.iter().any(|record| record_matches(record, column, &id)) {
        return Some(ScanOutcome::AlreadyScanned);
    }

    if let Some(record) = roster
        .records
        .iter()
        .find(|record| record_matches(record, column, &id))
    {
        ledger.push(record.clone());
        return Some(ScanOutcome::Registered);
    }

    if !unregistered.iter().any(|existing| existing == &id) {
        unregistered.push(id);
    }
    Some(ScanOutcome::Unregistered)
}
