//! Session aggregate and lifecycle: roster, identifier column, event name,
//! attendance ledger, unregistered scans, admin view flag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::{Record, Roster};

pub mod ledger;
pub mod partition;
pub mod store;

pub use ledger::ScanOutcome;
pub use partition::Partitions;

/// Derived lifecycle phase. `Active` means scanning-ready with the admin
/// view hidden; anything configured but still admin-revealed (or missing a
/// column/event) is `Configuring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Configuring,
    Active,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Configuring => "configuring",
            Self::Active => "active",
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    NoRoster,
    UnknownColumn(String),
    ScanningDisabled,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRoster => write!(f, "no roster loaded"),
            Self::UnknownColumn(name) => {
                write!(f, "column '{name}' does not exist in the loaded roster")
            }
            Self::ScanningDisabled => {
                write!(f, "scanning requires a loaded roster and a selected identifier column")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// The whole session state. Every field deserializes to its documented
/// default when absent from the persisted file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub roster: Option<Roster>,
    #[serde(default)]
    pub identifier_column: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub admin_visible: bool,
    #[serde(default)]
    pub ledger: Vec<Record>,
    #[serde(default)]
    pub unregistered: Vec<String>,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.roster.is_none() {
            return SessionPhase::Empty;
        }
        if !self.admin_visible
            && !self.identifier_column.is_empty()
            && !self.event_name.is_empty()
        {
            return SessionPhase::Active;
        }
        SessionPhase::Configuring
    }

    /// Scanning is gated on roster + column only; the admin flag is a pure
    /// view toggle and never blocks scans.
    pub fn scanning_enabled(&self) -> bool {
        match &self.roster {
            Some(roster) => {
                !self.identifier_column.is_empty() && roster.has_column(&self.identifier_column)
            }
            None => false,
        }
    }

    /// Replace the roster wholesale. A previously chosen identifier column
    /// that does not exist in the new roster is cleared; the ledger and
    /// unregistered sequence are always cleared because ledger entries are
    /// rows of the replaced roster. Returns whether the column was cleared.
    pub fn replace_roster(&mut self, roster: Roster) -> bool {
        let column_cleared =
            !self.identifier_column.is_empty() && !roster.has_column(&self.identifier_column);
        if column_cleared {
            self.identifier_column.clear();
        }
        self.ledger.clear();
        self.unregistered.clear();
        self.roster = Some(roster);
        column_cleared
    }

    pub fn set_identifier_column(&mut self, column: &str) -> Result<(), SessionError> {
        let roster = self.roster.as_ref().ok_or(SessionError::NoRoster)?;
        if !roster.has_column(column) {
            return Err(SessionError::UnknownColumn(column.to_string()));
        }
        self.identifier_column = column.to_string();
        Ok(())
    }

    pub fn set_event_name(&mut self, name: &str) {
        self.event_name = name.trim().to_string();
    }

    /// Classify one scan. `Ok(None)` is the empty-input no-op.
    pub fn scan(&mut self, id: &str) -> Result<Option<ScanOutcome>, SessionError> {
        if !self.scanning_enabled() {
            return Err(SessionError::ScanningDisabled);
        }
        let roster = self.roster.as_ref().ok_or(SessionError::ScanningDisabled)?;
        Ok(ledger::record_scan(
            id,
            roster,
            &self.identifier_column,
            &mut self.ledger,
            &mut self.unregistered,
        ))
    }

    pub fn partitions(&self) -> Partitions {
        match &self.roster {
            Some(roster) => partition::build_partitions(
                roster,
                &self.identifier_column,
                &self.ledger,
                &self.unregistered,
            ),
            None => Partitions::default(),
        }
    }

    /// Reset every field to its empty default. Irreversible.
    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::parse::parse_csv;

    fn configured_session() -> Session {
        let mut session = Session::default();
        session.replace_roster(parse_csv("id,name\n1,A\n2,B\n").expect("roster"));
        session.set_identifier_column("id").expect("column");
        session.set_event_name("Demo Day");
        session
    }

    #[test]
    fn phase_tracks_configuration() {
        let mut session = Session::default();
        assert_eq!(session.phase(), SessionPhase::Empty);

        session.replace_roster(parse_csv("id\n1\n").expect("roster"));
        session.admin_visible = true;
        assert_eq!(session.phase(), SessionPhase::Configuring);

        session.set_identifier_column("id").expect("column");
        session.set_event_name("Expo");
        assert_eq!(session.phase(), SessionPhase::Configuring);

        session.admin_visible = false;
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn empty_roster_parse_is_accepted_and_stays_configuring() {
        let mut session = Session::default();
        session.replace_roster(parse_csv("id,name\n").expect("roster"));
        assert_eq!(session.phase(), SessionPhase::Configuring);
        // Nothing to scan against, but selecting the column itself is legal.
        session.set_identifier_column("id").expect("column");
    }

    #[test]
    fn selecting_unknown_column_is_rejected() {
        let mut session = Session::default();
        session.replace_roster(parse_csv("id\n1\n").expect("roster"));
        let err = session.set_identifier_column("badge").expect_err("unknown");
        assert!(matches!(err, SessionError::UnknownColumn(_)));
    }

    #[test]
    fn replacing_roster_clears_stale_column_and_ledger() {
        let mut session = configured_session();
        session.scan("1").expect("scan").expect("outcome");
        assert_eq!(session.ledger.len(), 1);

        let cleared = session.replace_roster(parse_csv("badge,name\nx,Y\n").expect("roster"));
        assert!(cleared);
        assert!(session.identifier_column.is_empty());
        assert!(session.ledger.is_empty());
        assert!(session.unregistered.is_empty());
        assert_eq!(session.event_name, "Demo Day");
    }

    #[test]
    fn replacing_roster_keeps_column_still_present() {
        let mut session = configured_session();
        let cleared = session.replace_roster(parse_csv("id,email\n5,a@b\n").expect("roster"));
        assert!(!cleared);
        assert_eq!(session.identifier_column, "id");
    }

    #[test]
    fn scan_without_column_is_disabled() {
        let mut session = Session::default();
        session.replace_roster(parse_csv("id\n1\n").expect("roster"));
        let err = session.scan("1").expect_err("disabled");
        assert!(matches!(err, SessionError::ScanningDisabled));
    }

    #[test]
    fn clear_resets_every_field() {
        let mut session = configured_session();
        session.admin_visible = true;
        session.scan("1").expect("scan");
        session.scan("9").expect("scan");

        session.clear();
        assert!(session.roster.is_none());
        assert!(session.identifier_column.is_empty());
        assert!(session.event_name.is_empty());
        assert!(!session.admin_visible);
        assert!(session.ledger.is_empty());
        assert!(session.unregistered.is_empty());
    }

    #[test]
    fn two_person_roster_scan_flow() {
        let mut session = configured_session();
        assert_eq!(session.scan("1").unwrap(), Some(ScanOutcome::Registered));
        assert_eq!(session.scan("1").unwrap(), Some(ScanOutcome::AlreadyScanned));
        assert_eq!(session.scan("9").unwrap(), Some(ScanOutcome::Unregistered));

        let partitions = session.partitions();
        assert_eq!(partitions.attended.len(), 1);
        assert_eq!(partitions.not_attended.len(), 1);
        assert_eq!(partitions.not_registered.len(), 1);
        assert_eq!(
            partitions.attended[0].get("name").map(|c| c.as_key()),
            Some("A".to_string())
        );
        assert_eq!(
            partitions.not_attended[0].get("name").map(|c| c.as_key()),
            Some("B".to_string())
        );
    }
}
