use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const CACHE_VERSION: u32 = 5;
pub const API_MARKER: &str = "/api/";
pub const STATIC_ASSETS: &[&str] = &["/", "/sw.js"];

pub fn cache_name() -> String {
    format!("juggle-records-v{CACHE_VERSION}")
}

/// API traffic always goes to the network, never to a cache.
pub fn is_api_path(path: &str) -> bool {
    path.contains(API_MARKER)
}

pub fn render_service_worker() -> String {
    let assets = serde_json::to_string(STATIC_ASSETS).unwrap_or_else(|_| "[]".to_string());
    SERVICE_WORKER_JS
        .replace("{{CACHE_NAME}}", &cache_name())
        .replace("{{ASSETS}}", &assets)
        .replace("{{API_MARKER}}", API_MARKER)
}

pub async fn service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        render_service_worker(),
    )
}

pub async fn no_store_for_api(request: Request, next: Next) -> Response {
    let api = is_api_path(request.uri().path());
    let mut response = next.run(request).await;
    if api {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}

const SERVICE_WORKER_JS: &str = r#"const CACHE_NAME = '{{CACHE_NAME}}';
const ASSETS = {{ASSETS}};

self.addEventListener('install', (e) => {
  self.skipWaiting();
  e.waitUntil(caches.open(CACHE_NAME).then((cache) => cache.addAll(ASSETS)));
});

self.addEventListener('fetch', (e) => {
  if (e.request.url.includes('{{API_MARKER}}')) return;

  e.respondWith(
    caches.match(e.request).then((cached) => cached || fetch(e.request))
  );
});

self.addEventListener('activate', (e) => {
  e.waitUntil(
    caches.keys().then((keys) =>
      Promise.all(keys.filter((k) => k !== CACHE_NAME).map((k) => caches.delete(k)))
    )
  );
});
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_bypass_cache() {
        assert!(is_api_path("/api/bins/abc"));
        assert!(is_api_path("/api/records"));
        assert!(!is_api_path("/"));
        assert!(!is_api_path("/sw.js"));
    }

    #[test]
    fn worker_script_embeds_version_and_assets() {
        let script = render_service_worker();
        assert!(script.contains("const CACHE_NAME = 'juggle-records-v5';"));
        assert!(script.contains(r#"const ASSETS = ["/","/sw.js"];"#));
        assert!(script.contains("includes('/api/')"));
        assert!(script.contains("keys.filter((k) => k !== CACHE_NAME)"));
        assert!(!script.contains("{{"));
    }
}
