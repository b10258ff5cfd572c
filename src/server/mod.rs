use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;

use crate::session::store::SessionStore;

pub mod api;
pub mod routes;

const MAX_HEADER_BYTES: usize = 64 * 1024;

pub fn run_server(bind_addr: &str, data_dir: &Path) -> std::io::Result<()> {
    let store = SessionStore::open(data_dir);
    let listener = TcpListener::bind(bind_addr)?;
    println!(
        "rollcall listening on http://{bind_addr} (data dir: {})",
        data_dir.display()
    );

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &store) {
                    eprintln!("request error: {err}");
                }
            }
            Err(err) => eprintln!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

/// Read one request (Content-Length aware, so roster uploads larger than a
/// single read arrive whole), route it, and write the response.
fn handle_connection(stream: &mut TcpStream, store: &SessionStore) -> std::io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0_u8; 16_384];

    let header_end = loop {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break None;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
        if let Some(pos) = find_header_end(&buffer) {
            break Some(pos);
        }
        if buffer.len() > MAX_HEADER_BYTES {
            break None;
        }
    };
    let Some(header_end) = header_end else {
        return Ok(());
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let content_length = parse_content_length(&head);
    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
    }
    let body_end = (body_start + content_length).min(buffer.len());
    let body = String::from_utf8_lossy(&buffer[body_start..body_end]).into_owned();

    let request_line = head.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(method, path, &body, store).to_http_string();
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}
