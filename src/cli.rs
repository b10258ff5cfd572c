//! Command dispatch for the `rollcall` binary. Every command operates on
//! the session store under `ROLLCALL_DATA_DIR` (default `data`), the same
//! store the server uses.

use std::env;
use std::path::PathBuf;

use crate::export::export_session;
use crate::roster::parse::load_roster_file;
use crate::server;
use crate::server::api;
use crate::session::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Load,
    Column,
    Event,
    Scan,
    Status,
    Export,
    Clear,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("load") => Some(Command::Load),
        Some("column") => Some(Command::Column),
        Some("event") => Some(Command::Event),
        Some("scan") => Some(Command::Scan),
        Some("status") => Some(Command::Status),
        Some("export") => Some(Command::Export),
        Some("clear") => Some(Command::Clear),
        _ => None,
    }
}

fn data_dir() -> PathBuf {
    env::var("ROLLCALL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Load) => handle_load(args),
        Some(Command::Column) => handle_column(args),
        Some(Command::Event) => handle_event(args),
        Some(Command::Scan) => handle_scan(args),
        Some(Command::Status) => handle_status(),
        Some(Command::Export) => handle_export(),
        Some(Command::Clear) => handle_clear(),
        None => {
            eprintln!("usage: rollcall <serve|load|column|event|scan|status|export|clear>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("ROLLCALL_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr, &data_dir()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_load(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: rollcall load <roster.csv|.xlsx|.xls>");
        return 2;
    };

    let roster = match load_roster_file(std::path::Path::new(path)) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("load failed: {err}");
            return 1;
        }
    };

    let records = roster.len();
    let columns = roster.columns.join(", ");
    let store = SessionStore::open(&data_dir());
    match store.update(|session| session.replace_roster(roster)) {
        Ok(column_cleared) => {
            println!("roster loaded: records={records}, columns=[{columns}]");
            if column_cleared {
                println!("identifier column reset: it does not exist in the new roster");
            }
            0
        }
        Err(err) => {
            eprintln!("load failed: {err}");
            1
        }
    }
}

fn handle_column(args: &[String]) -> i32 {
    let Some(column) = args.get(2) else {
        eprintln!("usage: rollcall column <name>");
        return 2;
    };

    let store = SessionStore::open(&data_dir());
    match store.update(|session| session.set_identifier_column(column)) {
        Ok(Ok(())) => {
            println!("identifier column set: {column}");
            0
        }
        Ok(Err(err)) => {
            eprintln!("column not set: {err}");
            1
        }
        Err(err) => {
            eprintln!("column not set: {err}");
            1
        }
    }
}

fn handle_event(args: &[String]) -> i32 {
    let Some(name) = args.get(2) else {
        eprintln!("usage: rollcall event <name>");
        return 2;
    };

    let store = SessionStore::open(&data_dir());
    match store.update(|session| session.set_event_name(name)) {
        Ok(()) => {
            println!("event name set: {}", name.trim());
            0
        }
        Err(err) => {
            eprintln!("event name not set: {err}");
            1
        }
    }
}

fn handle_scan(args: &[String]) -> i32 {
    let ids = &args[2.min(args.len())..];
    if ids.is_empty() {
        eprintln!("usage: rollcall scan <id> [<id> ...]");
        return 2;
    }

    let store = SessionStore::open(&data_dir());
    for id in ids {
        let scanned = store.update(|session| session.scan(id));
        match scanned {
            Ok(Ok(Some(outcome))) => println!("{id}: {}", outcome.as_str()),
            Ok(Ok(None)) => println!("{id}: ignored (empty input)"),
            Ok(Err(err)) => {
                eprintln!("scan failed: {err}");
                return 1;
            }
            Err(err) => {
                eprintln!("scan failed: {err}");
                return 1;
            }
        }
    }
    0
}

fn handle_status() -> i32 {
    let store = SessionStore::open(&data_dir());
    match api::session_payload(&store) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("status failed: {err}");
            1
        }
    }
}

fn handle_export() -> i32 {
    let dir = data_dir();
    let store = SessionStore::open(&dir);
    let session = match store.snapshot() {
        Ok(session) => session,
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };
    match export_session(&session, &dir) {
        Ok(report) => {
            println!(
                "export complete: {} (attended={}, did_not_attend={}, not_registered={})",
                report.path, report.attended, report.not_attended, report.not_registered
            );
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_clear() -> i32 {
    let store = SessionStore::open(&data_dir());
    match store.update(|session| session.clear()) {
        Ok(()) => {
            println!("session cleared");
            0
        }
        Err(err) => {
            eprintln!("clear failed: {err}");
            1
        }
    }
}
