//! Minimal HTTP server for the browser dashboard.
//!
//! Connections are handled one at a time against a single in-memory
//! `Dashboard`. Only the request line matters; headers and bodies are read
//! and discarded.
//!
//! Routes:
//! - `GET /` overview page
//! - `GET /financial[?condition=...]` financial page
//! - `GET /fragment/financial?condition=...` condition-dependent charts only
//! - `GET /api/summary` metric summary JSON
//! - `GET|POST /api/refresh` re-read the dataset
//! - `GET /health`

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::dashboard::{Dashboard, DashboardEvent, Page};
use crate::domain::LoanCondition;
use crate::error::AppError;
use crate::html::{self, RenderMode};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";

const MAX_BODY_BYTES: u64 = 64 * 1024;
const MAX_LINE_BYTES: u64 = 8 * 1024;
const MAX_HEADERS: usize = 100;
const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json(status: u16, value: serde_json::Value) -> Self {
        Self { status, content_type: "application/json", body: value.to_string() }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self { status, content_type: "text/plain; charset=utf-8", body: body.into() }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Full HTTP/1.1 response, headers and body.
    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Cache-Control: no-store\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Bind `addr` and serve until the process is stopped.
pub fn serve(dash: Dashboard, addr: &str) -> Result<(), AppError> {
    let listener =
        TcpListener::bind(addr).map_err(|e| AppError::runtime(format!("Failed to bind '{addr}': {e}")))?;
    info!(addr, rows = dash.table().len(), "dashboard listening on http://{addr}/");
    serve_on(dash, listener);
    Ok(())
}

/// Accept loop over an already bound listener.
pub fn serve_on(mut dash: Dashboard, listener: TcpListener) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_connection(&mut dash, stream) {
                    warn!(error = %e, "connection failed");
                }
            }
            Err(e) => warn!(error = %e, "accept failed"),
        }
    }
}

fn handle_connection(dash: &mut Dashboard, stream: TcpStream) -> std::io::Result<()> {
    // Connections are served in turn; an idle client must not hold the loop.
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if read_capped_line(&mut reader, &mut request_line)? == 0 {
        return Ok(());
    }

    let mut content_length = 0u64;
    for _ in 0..MAX_HEADERS {
        let mut header = String::new();
        if read_capped_line(&mut reader, &mut header)? == 0 || header.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    if content_length > 0 {
        let mut sink = Vec::new();
        reader.take(content_length.min(MAX_BODY_BYTES)).read_to_end(&mut sink)?;
    }

    let response = handle_request(dash, request_line.trim_end());
    let mut writer = &stream;
    writer.write_all(response.to_http().as_bytes())?;
    writer.flush()
}

/// `read_line` bounded to `MAX_LINE_BYTES`.
fn read_capped_line<R: BufRead>(reader: &mut R, buf: &mut String) -> std::io::Result<usize> {
    reader.by_ref().take(MAX_LINE_BYTES).read_line(buf)
}

/// Route one request line (`GET /path?query HTTP/1.1`).
pub fn handle_request(dash: &mut Dashboard, request_line: &str) -> Response {
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Response::text(400, "Malformed request line");
    };
    let Ok(url) = Url::parse("http://localhost").and_then(|base| base.join(target)) else {
        return Response::text(400, "Malformed request target");
    };

    let response = route(dash, method, &url);
    info!(method, path = url.path(), status = response.status, "request");
    response
}

fn route(dash: &mut Dashboard, method: &str, url: &Url) -> Response {
    let path = url.path();
    let known = matches!(
        path,
        "/" | "/index.html" | "/financial" | "/fragment/financial" | "/api/summary" | "/api/refresh" | "/health"
    );
    if !known {
        return Response::text(404, "Not Found");
    }
    let allowed = match path {
        "/api/refresh" => method == "GET" || method == "POST",
        _ => method == "GET",
    };
    if !allowed {
        return Response::text(405, "Method Not Allowed");
    }

    match path {
        "/" | "/index.html" => page(dash, Page::Overview),
        "/financial" => {
            if let Err(resp) = select_from_query(dash, url, false) {
                return resp;
            }
            page(dash, Page::Financial)
        }
        "/fragment/financial" => {
            if let Err(resp) = select_from_query(dash, url, true) {
                return resp;
            }
            let size = (dash.config().chart_width, dash.config().chart_height);
            match html::render_condition_views(dash.financial(), size) {
                Ok(body) => Response::html(body),
                Err(e) => Response::text(500, e.message().to_string()),
            }
        }
        "/api/summary" => match serde_json::to_value(&dash.overview().metrics) {
            Ok(value) => Response::json(200, value),
            Err(e) => Response::text(500, format!("Failed to encode summary: {e}")),
        },
        "/api/refresh" => match dash.apply(DashboardEvent::Refresh) {
            Ok(changed) => Response::json(
                200,
                serde_json::json!({
                    "status": "ok",
                    "rows": dash.table().len(),
                    "recomputed": changed.iter().map(|v| v.name()).collect::<Vec<_>>(),
                }),
            ),
            Err(e) => {
                warn!(error = %e, "refresh failed; keeping previous data");
                Response::json(500, serde_json::json!({ "status": "error", "message": e.message() }))
            }
        },
        _ => Response::json(200, serde_json::json!({ "status": "ok" })),
    }
}

fn page(dash: &Dashboard, page: Page) -> Response {
    match html::render_page(dash, page, RenderMode::Live) {
        Ok(body) => Response::html(body),
        Err(e) => Response::text(500, e.message().to_string()),
    }
}

/// Apply `?condition=` when present. A missing value is an error only when
/// `required`.
fn select_from_query(dash: &mut Dashboard, url: &Url, required: bool) -> Result<(), Response> {
    let value = url
        .query_pairs()
        .find(|(k, _)| k == "condition")
        .map(|(_, v)| v.into_owned());
    let Some(value) = value else {
        return if required {
            Err(Response::text(400, "Missing condition"))
        } else {
            Ok(())
        };
    };
    let Some(condition) = LoanCondition::parse(&value) else {
        return Err(Response::text(400, format!("Unknown loan condition '{value}'")));
    };
    let changed = dash.select_condition(condition);
    debug!(condition = %condition, recomputed = changed.len(), "condition selected");
    Ok(())
}
