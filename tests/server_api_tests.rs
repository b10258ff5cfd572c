use rollcall::server::routes::route_request;
use rollcall::session::store::SessionStore;

fn store() -> (tempfile::TempDir, SessionStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::open(dir.path());
    (dir, store)
}

fn json_body(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

fn configure(store: &SessionStore) {
    let response = route_request("POST", "/api/roster", "id,name\n1,A\n2,B\n", store);
    assert_eq!(response.status_code, 200);
    let response = route_request("PUT", "/api/session/column", r#"{"column":"id"}"#, store);
    assert_eq!(response.status_code, 200);
    let response = route_request("PUT", "/api/session/event", r#"{"name":"Expo"}"#, store);
    assert_eq!(response.status_code, 200);
}

#[test]
fn health_endpoint_returns_ok_json() {
    let (_dir, store) = store();
    let response = route_request("GET", "/api/health", "", &store);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn console_page_is_served_at_root() {
    let (_dir, store) = store();
    let response = route_request("GET", "/", "", &store);
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("Rollcall"));
}

#[test]
fn unknown_route_is_404() {
    let (_dir, store) = store();
    let response = route_request("GET", "/api/nope", "", &store);
    assert_eq!(response.status_code, 404);
}

#[test]
fn raw_csv_upload_replaces_roster() {
    let (_dir, store) = store();
    let response = route_request("POST", "/api/roster", "id,name\n1,A\n2,B\n", &store);
    assert_eq!(response.status_code, 200);

    let payload = json_body(&response.body);
    assert_eq!(payload["records"], 2);
    assert_eq!(payload["columns"][0], "id");
    assert_eq!(payload["identifier_column_cleared"], false);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["phase"], "configuring");
    assert_eq!(session["roster_count"], 2);
}

#[test]
fn empty_upload_body_is_rejected_without_state_change() {
    let (_dir, store) = store();
    configure(&store);

    let response = route_request("POST", "/api/roster", "   ", &store);
    assert_eq!(response.status_code, 400);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["roster_count"], 2);
    assert_eq!(session["identifier_column"], "id");
}

#[test]
fn unsupported_roster_extension_is_rejected_without_state_change() {
    let (_dir, store) = store();
    configure(&store);

    let response = route_request("POST", "/api/roster", r#"{"path":"roster.pdf"}"#, &store);
    assert_eq!(response.status_code, 400);
    assert!(json_body(&response.body)["message"]
        .as_str()
        .expect("message")
        .contains(".pdf"));

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["roster_count"], 2);
}

#[test]
fn column_must_exist_in_roster() {
    let (_dir, store) = store();
    route_request("POST", "/api/roster", "id,name\n1,A\n", &store);

    let response = route_request("PUT", "/api/session/column", r#"{"column":"badge"}"#, &store);
    assert_eq!(response.status_code, 400);

    let response = route_request("PUT", "/api/session/column", r#"{"column":"id"}"#, &store);
    assert_eq!(response.status_code, 200);
}

#[test]
fn column_selection_without_roster_is_a_conflict() {
    let (_dir, store) = store();
    let response = route_request("PUT", "/api/session/column", r#"{"column":"id"}"#, &store);
    assert_eq!(response.status_code, 409);
}

#[test]
fn scan_flow_classifies_all_three_outcomes() {
    let (_dir, store) = store();
    configure(&store);

    let first = json_body(&route_request("POST", "/api/scan", r#"{"id":"1"}"#, &store).body);
    assert_eq!(first["outcome"], "registered");
    assert_eq!(first["attended_count"], 1);
    assert_eq!(first["record"]["name"], "A");

    let second = json_body(&route_request("POST", "/api/scan", r#"{"id":"1"}"#, &store).body);
    assert_eq!(second["outcome"], "already_scanned");
    assert_eq!(second["attended_count"], 1);

    let third = json_body(&route_request("POST", "/api/scan", r#"{"id":"9"}"#, &store).body);
    assert_eq!(third["outcome"], "unregistered");
    assert!(third["record"].is_null());

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["attended_count"], 1);
    assert_eq!(session["unregistered"], serde_json::json!(["9"]));
}

#[test]
fn empty_scan_input_is_ignored() {
    let (_dir, store) = store();
    configure(&store);

    let response = json_body(&route_request("POST", "/api/scan", r#"{"id":"   "}"#, &store).body);
    assert_eq!(response["outcome"], "ignored");
    assert_eq!(response["attended_count"], 0);
}

#[test]
fn scan_before_configuration_is_a_conflict() {
    let (_dir, store) = store();
    let response = route_request("POST", "/api/scan", r#"{"id":"1"}"#, &store);
    assert_eq!(response.status_code, 409);
}

#[test]
fn malformed_scan_body_is_a_bad_request() {
    let (_dir, store) = store();
    configure(&store);
    let response = route_request("POST", "/api/scan", "{bad json}", &store);
    assert_eq!(response.status_code, 400);
    assert!(json_body(&response.body)["message"]
        .as_str()
        .expect("message")
        .contains("invalid request body"));
}

#[test]
fn partitions_reflect_scans() {
    let (_dir, store) = store();
    configure(&store);
    route_request("POST", "/api/scan", r#"{"id":"1"}"#, &store);
    route_request("POST", "/api/scan", r#"{"id":"9"}"#, &store);

    let partitions = json_body(&route_request("GET", "/api/partitions", "", &store).body);
    assert_eq!(partitions["attended"].as_array().map(Vec::len), Some(1));
    assert_eq!(partitions["not_attended"].as_array().map(Vec::len), Some(1));
    assert_eq!(partitions["not_attended"][0]["name"], "B");
    assert_eq!(partitions["not_registered"][0]["id"], "9");
}

#[test]
fn replacing_roster_clears_stale_column() {
    let (_dir, store) = store();
    configure(&store);

    let response = route_request("POST", "/api/roster", "badge,name\nx,Y\n", &store);
    assert_eq!(response.status_code, 200);
    assert_eq!(json_body(&response.body)["identifier_column_cleared"], true);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["identifier_column"], "");
    assert_eq!(session["attended_count"], 0);
    assert_eq!(session["scanning_enabled"], false);
}

#[test]
fn sequential_uploads_last_completed_wins() {
    let (_dir, store) = store();
    route_request("POST", "/api/roster", "id\n1\n2\n3\n", &store);
    route_request("POST", "/api/roster", "id\n7\n", &store);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["roster_count"], 1);
}

#[test]
fn admin_toggle_is_unconditional_and_gates_clear() {
    let (_dir, store) = store();
    configure(&store);

    // Hidden by default: clear and export are conflicts.
    assert_eq!(route_request("POST", "/api/session/clear", "", &store).status_code, 409);
    assert_eq!(route_request("POST", "/api/export", "", &store).status_code, 409);

    let response = route_request("PUT", "/api/session/admin", r#"{"visible":true}"#, &store);
    assert_eq!(response.status_code, 200);

    let response = route_request("POST", "/api/session/clear", "", &store);
    assert_eq!(response.status_code, 200);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["phase"], "empty");
    assert_eq!(session["roster_count"], 0);
    assert_eq!(session["event_name"], "");
    assert_eq!(session["admin_visible"], false);
}

#[test]
fn hiding_admin_after_configuration_activates_scanning_phase() {
    let (_dir, store) = store();
    configure(&store);
    route_request("PUT", "/api/session/admin", r#"{"visible":true}"#, &store);
    route_request("PUT", "/api/session/admin", r#"{"visible":false}"#, &store);

    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["phase"], "active");
    assert_eq!(session["scanning_enabled"], true);
}

#[test]
fn export_writes_workbook_into_data_dir() {
    let (dir, store) = store();
    configure(&store);
    route_request("POST", "/api/scan", r#"{"id":"1"}"#, &store);
    route_request("POST", "/api/scan", r#"{"id":"9"}"#, &store);
    route_request("PUT", "/api/session/admin", r#"{"visible":true}"#, &store);

    let response = route_request("POST", "/api/export", "", &store);
    assert_eq!(response.status_code, 200);

    let payload = json_body(&response.body);
    assert_eq!(payload["export"]["attended"], 1);
    assert_eq!(payload["export"]["not_attended"], 1);
    assert_eq!(payload["export"]["not_registered"], 1);

    let path = payload["export"]["path"].as_str().expect("path");
    assert!(path.starts_with(dir.path().to_str().expect("utf8 dir")));
    assert!(path.ends_with(".xlsx"));
    assert!(std::path::Path::new(path).is_file());
    assert!(path.contains("Expo_"));
}

#[test]
fn export_without_event_name_is_a_conflict() {
    let (_dir, store) = store();
    route_request("POST", "/api/roster", "id\n1\n", &store);
    route_request("PUT", "/api/session/column", r#"{"column":"id"}"#, &store);
    route_request("PUT", "/api/session/admin", r#"{"visible":true}"#, &store);

    let response = route_request("POST", "/api/export", "", &store);
    assert_eq!(response.status_code, 409);
}

#[test]
fn session_state_survives_store_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let store = SessionStore::open(dir.path());
        configure(&store);
        route_request("POST", "/api/scan", r#"{"id":"2"}"#, &store);
        route_request("POST", "/api/scan", r#"{"id":"9"}"#, &store);
    }

    let store = SessionStore::open(dir.path());
    let session = json_body(&route_request("GET", "/api/session", "", &store).body);
    assert_eq!(session["phase"], "active");
    assert_eq!(session["roster_count"], 2);
    assert_eq!(session["attended_count"], 1);
    assert_eq!(session["ledger"][0]["name"], "B");
    assert_eq!(session["unregistered"], serde_json::json!(["9"]));
}
