//! `app://` protocol: serves files from the application directory.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use wry::http::header::{HeaderValue, CONTENT_SECURITY_POLICY, CONTENT_TYPE};
use wry::http::{Response, StatusCode};

const CSP_DEV: &str = "default-src 'self' app:; \
    script-src 'self' app: 'unsafe-inline' 'unsafe-eval'; \
    style-src 'self' app: 'unsafe-inline'; \
    connect-src 'self' app: ws://localhost:* ws://127.0.0.1:* http://localhost:* http://127.0.0.1:*; \
    img-src 'self' app: data: blob:; \
    font-src 'self' app: data:;";

const CSP_RELEASE: &str = "default-src 'self' app:; \
    script-src 'self' app:; \
    style-src 'self' app: 'unsafe-inline'; \
    img-src 'self' app: data: blob:; \
    font-src 'self' app: data:; \
    connect-src 'self' app:;";

/// Pages served by the host itself, below `app://__forge/`
const BUILTIN_PAGES: &[(&str, &str)] = &[("__forge/devtools.html", include_str!("devtools.html"))];

pub fn mime_for(path: &str) -> &'static str {
    let ext = Path::new(path).extension().and_then(|s| s.to_str());
    match ext {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

pub struct AssetServer {
    root: PathBuf,
    dev: bool,
}

impl AssetServer {
    pub fn new(root: impl Into<PathBuf>, dev: bool) -> Self {
        Self {
            root: root.into(),
            dev,
        }
    }

    /// Map an `app://` URI onto a file below the root. `None` for paths that
    /// would leave it.
    pub fn resolve(&self, uri: &str) -> Option<(String, PathBuf)> {
        let path = uri
            .strip_prefix("app://")
            // WebView2 exposes custom schemes as http://<scheme>.localhost
            .or_else(|| uri.strip_prefix("http://app.localhost/"))
            .unwrap_or(uri)
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_start_matches('/')
            .trim_end_matches('/');
        let path = if path.is_empty() { "index.html" } else { path };

        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some((path.to_string(), self.root.join(relative)))
    }

    pub fn respond(&self, uri: &str) -> Response<Cow<'static, [u8]>> {
        let Some((path, file)) = self.resolve(uri) else {
            tracing::warn!("Rejected asset request outside the app directory: {}", uri);
            return text(StatusCode::FORBIDDEN, "Forbidden");
        };

        if let Some((_, page)) = BUILTIN_PAGES.iter().find(|(name, _)| *name == path) {
            return self.content(&path, Cow::Borrowed(page.as_bytes()));
        }

        match std::fs::read(&file) {
            Ok(bytes) => self.content(&path, Cow::Owned(bytes)),
            Err(e) => {
                tracing::debug!("Asset {} unavailable: {}", file.display(), e);
                text(StatusCode::NOT_FOUND, &format!("Not found: {}", path))
            }
        }
    }

    fn content(&self, path: &str, body: Cow<'static, [u8]>) -> Response<Cow<'static, [u8]>> {
        let mut response = Response::new(body);
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime_for(path)));
        headers.insert(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(if self.dev { CSP_DEV } else { CSP_RELEASE }),
        );
        response
    }
}

fn text(status: StatusCode, body: &str) -> Response<Cow<'static, [u8]>> {
    let mut response = Response::new(Cow::Owned(body.as_bytes().to_vec()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
