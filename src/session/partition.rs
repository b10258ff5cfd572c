//! Pre-export partitioning of the session into attended, not-attended, and
//! not-registered tables. Pure transform over current session state.

use std::collections::HashSet;

use serde::Serialize;

use crate::roster::{CellValue, Record, Roster};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Partitions {
    pub attended: Vec<Record>,
    pub not_attended: Vec<Record>,
    pub not_registered: Vec<Record>,
}

/// Build the three export partitions.
///
/// `attended` is the ledger in scan order. `not_attended` is every roster
/// record whose identifier value matches no ledger entry, in roster order.
/// `not_registered` renders each unregistered id as a single-field record
/// so the export schema stays uniform for that one column.
pub fn build_partitions(
    roster: &Roster,
    column: &str,
    ledger: &[Record],
    unregistered: &[String],
) -> Partitions {
    let scanned: HashSet<String> = ledger
        .iter()
        .filter_map(|record| record.get(column).map(|cell| cell.as_key()))
        .collect();

    let not_attended = roster
        .records
        .iter()
        .filter(|record| {
            let key = record.get(column).map(|cell| cell.as_key()).unwrap_or_default();
            !scanned.contains(&key)
        })
        .cloned()
        .collect();

    let not_registered = unregistered
        .iter()
        .map(|id| {
            let mut record = Record::new();
            record.insert(column.to_string(), CellValue::Text(id.clone()));
            record
        })
        .collect();

    Partitions {
        attended: ledger.to_vec(),
        not_attended,
        not_registered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> Record {
        let mut r = Record::new();
        r.insert("id".to_string(), CellValue::Text(id.to_string()));
        r.insert("name".to_string(), CellValue::Text(name.to_string()));
        r
    }

    #[test]
    fn partitions_split_roster_by_ledger_membership() {
        let roster = Roster {
            columns: vec!["id".to_string(), "name".to_string()],
            records: vec![record("1", "A"), record("2", "B"), record("3", "C")],
        };
        let ledger = vec![record("3", "C"), record("1", "A")];
        let unregistered = vec!["9".to_string()];

        let partitions = build_partitions(&roster, "id", &ledger, &unregistered);

        assert_eq!(partitions.attended, ledger);
        assert_eq!(partitions.not_attended, vec![record("2", "B")]);
        assert_eq!(partitions.not_registered.len(), 1);
        assert_eq!(
            partitions.not_registered[0].get("id"),
            Some(&CellValue::Text("9".to_string()))
        );
        assert_eq!(partitions.not_registered[0].len(), 1);
    }

    #[test]
    fn attended_and_not_attended_reconstruct_the_roster() {
        let roster = Roster {
            columns: vec!["id".to_string(), "name".to_string()],
            records: (0..10).map(|i| record(&i.to_string(), "x")).collect(),
        };
        let mut ledger = Vec::new();
        let mut unregistered = Vec::new();
        for id in ["4", "7", "4", "99"] {
            crate::session::ledger::record_scan(id, &roster, "id", &mut ledger, &mut unregistered);
        }

        let partitions = build_partitions(&roster, "id", &ledger, &unregistered);
        let mut ids: Vec<String> = partitions
            .attended
            .iter()
            .chain(partitions.not_attended.iter())
            .map(|r| r.get("id").map(|c| c.as_key()).unwrap_or_default())
            .collect();
        ids.sort_by_key(|s| s.parse::<u32>().unwrap_or(0));
        let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn empty_session_yields_empty_partitions() {
        let partitions = build_partitions(&Roster::default(), "id", &[], &[]);
        assert!(partitions.attended.is_empty());
        assert!(partitions.not_attended.is_empty());
        assert!(partitions.not_registered.is_empty());
    }
}
