//! HTTP response handlers for the staging root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use percent_encoding::percent_decode_str;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{RELOAD_JS, ReloadVars, reload_script_tag};
use crate::utils::mime::{self, types};

/// Route one request: the reload client, a file under `root`, or 404.
pub fn handle_request(request: Request, root: &Path, ws_port: u16) -> Result<()> {
    if crate::core::is_shutdown() {
        return send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec());
    }
    if !matches!(request.method(), Method::Get | Method::Head) {
        return send_body(request, 405, types::PLAIN, b"405 Method Not Allowed".to_vec());
    }

    if strip_query(request.url()) == crate::embed::serve::RELOAD_JS_PATH {
        let body = RELOAD_JS.render(&ReloadVars { ws_port });
        return send_body(request, 200, types::JAVASCRIPT, body.into_bytes());
    }

    match resolve_path(request.url(), root) {
        Some(path) => respond_file(request, &path),
        None => respond_not_found(request, root),
    }
}

/// Respond with a static file, injecting the reload client into HTML.
fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);
    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type);
    send_body(request, 200, content_type, body)
}

/// Respond with `404.html` from the root when present, plain text otherwise.
fn respond_not_found(request: Request, root: &Path) -> Result<()> {
    let custom = root.join("404.html");
    let has_custom = custom.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { types::HTML } else { types::PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom && let Ok(body) = fs::read(&custom) {
        let body = maybe_inject_reload(body, types::HTML);
        return send_body(request, 404, types::HTML, body);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Resolve URL to a file under `root`, handling `index.html` for directories.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    // Canonicalize so symlinks cannot escape the root either
    let canonical = root.join(&clean).canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Decode, strip the query string, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = strip_query(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn maybe_inject_reload(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_reload_script(&body)
    } else {
        body
    }
}

/// Insert the reload `<script>` before the last `</body>`, or append it.
pub fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = reload_script_tag();
    let script = script.as_bytes();
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<body></body>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/main.css"), ".a{}").unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        dir
    }

    #[test]
    fn test_resolve_files_and_indexes() {
        let dir = site();
        let root = dir.path();
        let canonical = root.canonicalize().unwrap();

        assert_eq!(resolve_path("/", root), Some(canonical.join("index.html")));
        assert_eq!(resolve_path("/css/main.css?v=2", root), Some(canonical.join("css/main.css")));
        assert_eq!(resolve_path("/docs/", root), Some(canonical.join("docs/index.html")));
        assert_eq!(resolve_path("/missing.js", root), None);
        assert_eq!(resolve_path("/css", root), None);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site();
        assert_eq!(resolve_path("/../etc/passwd", dir.path()), None);
        assert_eq!(resolve_path("/css/%2e%2e/%2e%2e/secret", dir.path()), None);
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        fs::write(dir.path().join("a b.html"), "x").unwrap();
        assert!(resolve_path("/a%20b.html", dir.path()).is_some());
    }

    #[test]
    fn test_inject_before_last_body() {
        let out = inject_reload_script(b"<p>a</p></BODY></html>");
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            format!("<p>a</p>{}</BODY></html>", reload_script_tag())
        );
    }

    #[test]
    fn test_inject_appends_without_body() {
        let out = String::from_utf8(inject_reload_script(b"<p>fragment</p>")).unwrap();
        assert!(out.starts_with("<p>fragment</p><script"));
    }

    #[test]
    fn test_non_html_untouched() {
        let body = b"</body>".to_vec();
        assert_eq!(maybe_inject_reload(body.clone(), types::CSS), body);
    }
}
