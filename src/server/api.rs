//! JSON payload builders for the local API. Each function validates its
//! input, runs against the session store, and returns a pretty-printed
//! JSON body or an [`ApiError`] the router maps to a status code.

use std::fmt;

use serde::Deserialize;
use serde_json::json;

use crate::export::{export_session, ExportError};
use crate::roster::parse::{load_roster_file, parse_csv, RosterError};
use crate::session::store::{SessionStore, StoreError};
use crate::session::{ScanOutcome, SessionError};

#[derive(Debug)]
pub enum ApiError {
    Parse(serde_json::Error),
    Validation(String),
    Conflict(String),
    Roster(RosterError),
    Store(StoreError),
    Export(ExportError),
}

impl ApiError {
    /// Status line the router should answer with.
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) | Self::Validation(_) | Self::Roster(_) => (400, "Bad Request"),
            Self::Conflict(_) => (409, "Conflict"),
            Self::Store(_) | Self::Export(_) => (500, "Internal Server Error"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid request body: {err}"),
            Self::Validation(msg) | Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

fn session_api_error(err: SessionError) -> ApiError {
    match err {
        SessionError::NoRoster | SessionError::ScanningDisabled => {
            ApiError::Conflict(err.to_string())
        }
        SessionError::UnknownColumn(_) => ApiError::Validation(err.to_string()),
    }
}

pub fn health_payload() -> Result<String, ApiError> {
    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "service": "rollcall-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
    .map_err(ApiError::Parse)
}

pub fn session_payload(store: &SessionStore) -> Result<String, ApiError> {
    let session = store.snapshot()?;
    let columns = session
        .roster
        .as_ref()
        .map(|roster| roster.columns.clone())
        .unwrap_or_default();
    let roster_count = session.roster.as_ref().map(|r| r.len()).unwrap_or(0);
    let phase = session.phase();
    let scanning_enabled = session.scanning_enabled();

    serde_json::to_string_pretty(&json!({
        "phase": phase.as_str(),
        "event_name": session.event_name,
        "identifier_column": session.identifier_column,
        "admin_visible": session.admin_visible,
        "scanning_enabled": scanning_enabled,
        "columns": columns,
        "roster_count": roster_count,
        "attended_count": session.ledger.len(),
        "unregistered_count": session.unregistered.len(),
        "ledger": session.ledger,
        "unregistered": session.unregistered,
    }))
    .map_err(ApiError::Parse)
}

/// POST /api/roster: body is either JSON `{"path": ...}` (load from disk,
/// extension-dispatched) or raw CSV text. Replaces the roster wholesale;
/// replacements run under the store lock, so the last completed upload wins.
pub fn roster_post_payload(store: &SessionStore, body: &str) -> Result<String, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("roster upload body is empty".to_string()));
    }

    let roster = if trimmed.starts_with('{') {
        #[derive(Debug, Deserialize)]
        struct In {
            path: String,
        }
        let input: In = serde_json::from_str(trimmed).map_err(ApiError::Parse)?;
        load_roster_file(std::path::Path::new(&input.path)).map_err(ApiError::Roster)?
    } else {
        parse_csv(body).map_err(ApiError::Roster)?
    };

    let records = roster.len();
    let columns = roster.columns.clone();
    let column_cleared = store.update(|session| session.replace_roster(roster))?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "records": records,
        "columns": columns,
        "identifier_column_cleared": column_cleared,
    }))
    .map_err(ApiError::Parse)
}

pub fn column_put_payload(store: &SessionStore, body: &str) -> Result<String, ApiError> {
    #[derive(Debug, Deserialize)]
    struct In {
        column: String,
    }
    let input: In = serde_json::from_str(body).map_err(ApiError::Parse)?;

    store
        .update(|session| session.set_identifier_column(&input.column))?
        .map_err(session_api_error)?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "identifier_column": input.column,
    }))
    .map_err(ApiError::Parse)
}

pub fn event_put_payload(store: &SessionStore, body: &str) -> Result<String, ApiError> {
    #[derive(Debug, Deserialize)]
    struct In {
        name: String,
    }
    let input: In = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let name = input.name.trim().to_string();
    store.update(|session| session.set_event_name(&name))?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "event_name": name,
    }))
    .map_err(ApiError::Parse)
}

/// Unconditional view toggle (keyboard shortcut semantics).
pub fn admin_put_payload(store: &SessionStore, body: &str) -> Result<String, ApiError> {
    #[derive(Debug, Deserialize)]
    struct In {
        visible: bool,
    }
    let input: In = serde_json::from_str(body).map_err(ApiError::Parse)?;
    store.update(|session| session.admin_visible = input.visible)?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "admin_visible": input.visible,
    }))
    .map_err(ApiError::Parse)
}

pub fn scan_payload(store: &SessionStore, body: &str) -> Result<String, ApiError> {
    #[derive(Debug, Deserialize)]
    struct In {
        id: String,
    }
    let input: In = serde_json::from_str(body).map_err(ApiError::Parse)?;

    let scanned = store.update(|session| {
        let outcome = session.scan(&input.id)?;
        let record = match outcome {
            Some(ScanOutcome::Registered) => session.ledger.last().cloned(),
            _ => None,
        };
        Ok::<_, SessionError>((outcome, session.ledger.len(), record))
    })?;
    let (outcome, attended_count, record) = scanned.map_err(session_api_error)?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "outcome": outcome.map(|o| o.as_str()).unwrap_or("ignored"),
        "attended_count": attended_count,
        "record": record,
    }))
    .map_err(ApiError::Parse)
}

pub fn partitions_payload(store: &SessionStore) -> Result<String, ApiError> {
    let session = store.snapshot()?;
    serde_json::to_string_pretty(&session.partitions()).map_err(ApiError::Parse)
}

/// Export and clear are offered from the admin-revealed view; the API
/// enforces the same gate.
pub fn export_payload(store: &SessionStore) -> Result<String, ApiError> {
    let session = store.snapshot()?;
    if !session.admin_visible {
        return Err(ApiError::Conflict(
            "export requires the admin view to be revealed".to_string(),
        ));
    }

    let report = export_session(&session, store.data_dir()).map_err(|err| match err {
        ExportError::NotConfigured => ApiError::Conflict(err.to_string()),
        other => ApiError::Export(other),
    })?;

    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "export": report,
    }))
    .map_err(ApiError::Parse)
}

pub fn clear_payload(store: &SessionStore) -> Result<String, ApiError> {
    let allowed = store.update(|session| {
        if !session.admin_visible {
            return false;
        }
        session.clear();
        true
    })?;
    if !allowed {
        return Err(ApiError::Conflict(
            "clearing the session requires the admin view to be revealed".to_string(),
        ));
    }

    serde_json::to_string_pretty(&json!({ "status": "ok" })).map_err(ApiError::Parse)
}
