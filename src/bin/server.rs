#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Component, Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Serves the browser build (index.html, glue js, wasm) for local play.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
struct Opts {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,
    /// Directory holding index.html and the wasm-pack output
    #[arg(long, default_value = "web")]
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let root = opts
        .root
        .canonicalize()
        .with_context(|| format!("web directory not found at {}", opts.root.display()))?;

    let server = Server::http(&opts.listen)
        .map_err(|e| anyhow::anyhow!("failed to listen on {}: {e}", opts.listen))?;
    println!("Serving {} on http://{}", root.display(), opts.listen);

    for request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let status = respond(&root, request);
        println!("{} {} -> {}", method, url, status.0);
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn respond(root: &Path, request: Request) -> StatusCode {
    let url = request.url().split('?').next().unwrap_or("/").to_string();
    let Some(path) = resolve(root, &url) else {
        let _ = request.respond(not_found_response());
        return StatusCode(404);
    };
    match fs::File::open(&path) {
        Ok(file) => {
            let mut resp = Response::from_file(file).with_status_code(StatusCode(200));
            for (name, value) in [
                ("Content-Type", content_type_for(&path)),
                ("Cache-Control", "no-cache"),
            ] {
                if let Ok(h) = Header::from_bytes(name, value) {
                    resp.add_header(h);
                }
            }
            let _ = request.respond(resp);
            StatusCode(200)
        }
        Err(_) => {
            let _ = request.respond(not_found_response());
            StatusCode(404)
        }
    }
}

/// Maps a request path onto a file under `root`, refusing anything that climbs out of it.
#[cfg(not(target_arch = "wasm32"))]
fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let rel = Path::new(url.trim_start_matches('/'));
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    let full = root.join(rel);
    let path = if full.is_dir() {
        full.join("index.html")
    } else {
        full
    };
    path.is_file().then_some(path)
}

#[cfg(not(target_arch = "wasm32"))]
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "wasm" => "application/wasm",
        "json" => "application/json",
        "ts" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn not_found_response() -> Response<Cursor<Vec<u8>>> {
    Response::from_string("Not Found").with_status_code(StatusCode(404))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn rejects_paths_that_leave_the_root() {
        let root = std::env::temp_dir();
        assert_eq!(resolve(&root, "/../etc/passwd"), None);
        assert_eq!(resolve(&root, "/./index.html"), None);
    }

    #[test]
    fn wasm_gets_its_own_mime_type() {
        assert_eq!(content_type_for(Path::new("pkg/blockfall_bg.wasm")), "application/wasm");
        assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }
}
