use crate::server::api;
use crate::session::store::SessionStore;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(method: &str, path: &str, body: &str, store: &SessionStore) -> HttpResponse {
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => api_response(api::health_payload()),
        ("GET", "/api/session") => api_response(api::session_payload(store)),
        ("POST", "/api/roster") => api_response(api::roster_post_payload(store, body)),
        ("PUT", "/api/session/column") => api_response(api::column_put_payload(store, body)),
        ("PUT", "/api/session/event") => api_response(api::event_put_payload(store, body)),
        ("PUT", "/api/session/admin") => api_response(api::admin_put_payload(store, body)),
        ("POST", "/api/scan") => api_response(api::scan_payload(store, body)),
        ("GET", "/api/partitions") => api_response(api::partitions_payload(store)),
        ("POST", "/api/export") => api_response(api::export_payload(store)),
        ("POST", "/api/session/clear") => api_response(api::clear_payload(store)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn api_response(result: Result<String, api::ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body: payload,
        },
        Err(err) => {
            let (status_code, status_text) = err.status();
            error_response(status_code, status_text, &err.to_string())
        }
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Rollcall</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 720px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 4px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, select, textarea { width: 100%; padding: 8px; box-sizing: border-box; }
    textarea { min-height: 110px; font-family: monospace; }
    button { margin-top: 10px; padding: 8px 14px; }
    .hint { color: #666; font-size: 0.9rem; }
    #notice { min-height: 1.4em; font-weight: 600; }
    #notice.registered { color: #1a7f37; }
    #notice.already_scanned { color: #9a6700; }
    #notice.unregistered { color: #cf222e; }
    #notice.error { color: #cf222e; }
    #scan-box input { font-size: 1.3rem; }
    .hidden { display: none; }
  </style>
</head>
<body>
  <h1>Rollcall</h1>
  <p id="phase" class="hint"></p>
  <p class="hint">Press the backtick key to toggle the admin panel.</p>

  <div id="admin" class="card hidden">
    <strong>Admin</strong>
    <label for="roster-path">Roster file path (.csv, .xlsx, .xls)</label>
    <input id="roster-path" placeholder="roster.xlsx" />
    <button id="load-btn">Load file</button>
    <label for="roster-csv">Or paste CSV (header row first)</label>
    <textarea id="roster-csv" placeholder="id,name"></textarea>
    <button id="upload-btn">Upload CSV</button>
    <label for="column">Identifier column</label>
    <select id="column"></select>
    <label for="event">Event name</label>
    <input id="event" placeholder="Open House" />
    <button id="event-btn">Save event name</button>
    <div>
      <button id="export-btn">Export workbook</button>
      <button id="clear-btn">Clear session</button>
    </div>
  </div>

  <div id="scan-box" class="card">
    <label for="scan">Scan / enter ID, then press Enter</label>
    <input id="scan" autocomplete="off" />
    <p id="notice"></p>
    <p id="counts" class="hint"></p>
  </div>

  <script>
    const noticeEl = document.getElementById('notice');
    const phaseEl = document.getElementById('phase');
    const countsEl = document.getElementById('counts');
    const adminEl = document.getElementById('admin');
    const columnEl = document.getElementById('column');
    const eventEl = document.getElementById('event');
    const scanEl = document.getElementById('scan');

    let uploadSeq = 0;

    function notify(text, kind) {
      noticeEl.textContent = text;
      noticeEl.className = kind || '';
    }

    async function call(path, method, payload) {
      const options = { method: method };
      if (payload !== undefined) {
        options.headers = { 'Content-Type': 'application/json' };
        options.body = typeof payload === 'string' ? payload : JSON.stringify(payload);
      }
      const response = await fetch(path, options);
      const data = await response.json().catch(() => ({}));
      if (!response.ok) throw new Error(data.message || ('HTTP ' + response.status));
      return data;
    }

    async function refresh() {
      const s = await call('/api/session', 'GET');
      phaseEl.textContent = 'Phase: ' + s.phase +
        (s.event_name ? ' | Event: ' + s.event_name : '') +
        (s.identifier_column ? ' | Column: ' + s.identifier_column : '');
      countsEl.textContent = 'Roster: ' + s.roster_count +
        ' | Attended: ' + s.attended_count +
        ' | Not registered: ' + s.unregistered_count;
      adminEl.classList.toggle('hidden', !s.admin_visible);
      scanEl.disabled = !s.scanning_enabled;
      columnEl.innerHTML = '';
      const blank = document.createElement('option');
      blank.value = '';
      blank.textContent = s.roster_count === 0 && s.columns.length === 0
        ? '(load a roster first)' : '(choose a column)';
      columnEl.appendChild(blank);
      for (const name of s.columns) {
        const option = document.createElement('option');
        option.value = name;
        option.textContent = name;
        option.selected = name === s.identifier_column;
        columnEl.appendChild(option);
      }
      if (!eventEl.value) eventEl.value = s.event_name;
    }

    async function uploadRoster(payload) {
      const seq = ++uploadSeq;
      const result = await call('/api/roster', 'POST', payload);
      if (seq !== uploadSeq) return; // a later upload finished; last completed wins
      notify('Roster loaded: ' + result.records + ' records' +
        (result.identifier_column_cleared ? ' (identifier column reset)' : ''), 'registered');
      await refresh();
    }

    document.getElementById('load-btn').addEventListener('click', () => {
      const path = document.getElementById('roster-path').value.trim();
      if (!path) return;
      uploadRoster({ path: path }).catch(e => notify(e.message, 'error'));
    });

    document.getElementById('upload-btn').addEventListener('click', () => {
      const csv = document.getElementById('roster-csv').value;
      if (!csv.trim()) return;
      uploadRoster(csv).catch(e => notify(e.message, 'error'));
    });

    columnEl.addEventListener('change', () => {
      if (!columnEl.value) return;
      call('/api/session/column', 'PUT', { column: columnEl.value })
        .then(refresh).catch(e => notify(e.message, 'error'));
    });

    document.getElementById('event-btn').addEventListener('click', () => {
      call('/api/session/event', 'PUT', { name: eventEl.value })
        .then(refresh).catch(e => notify(e.message, 'error'));
    });

    document.getElementById('export-btn').addEventListener('click', () => {
      call('/api/export', 'POST')
        .then(r => notify('Exported to ' + r.export.path, 'registered'))
        .catch(e => notify(e.message, 'error'));
    });

    document.getElementById('clear-btn').addEventListener('click', () => {
      if (!confirm('Clear the whole session? This cannot be undone.')) return;
      call('/api/session/clear', 'POST')
        .then(() => { eventEl.value = ''; notify('Session cleared', ''); return refresh(); })
        .catch(e => notify(e.message, 'error'));
    });

    scanEl.addEventListener('keydown', (e) => {
      if (e.key !== 'Enter') return;
      const id = scanEl.value.trim();
      scanEl.value = ''; // clear immediately so the same keystroke cannot double-submit
      if (!id) return;
      call('/api/scan', 'POST', { id: id }).then(r => {
        if (r.outcome === 'registered') notify(id + ' checked in', 'registered');
        else if (r.outcome === 'already_scanned') notify(id + ' was already scanned', 'already_scanned');
        else if (r.outcome === 'unregistered') notify(id + ' is not on the roster', 'unregistered');
        return refresh();
      }).catch(e => notify(e.message, 'error'));
    });

    document.addEventListener('keydown', (e) => {
      if (e.key !== '`') return;
      e.preventDefault(); // the toggle key is never data
      const visible = adminEl.classList.contains('hidden');
      call('/api/session/admin', 'PUT', { visible: visible })
        .then(refresh).catch(e => notify(e.message, 'error'));
    });

    refresh().catch(e => notify(e.message, 'error'));
  </script>
</body>
</html>
"##
    .to_string()
}
