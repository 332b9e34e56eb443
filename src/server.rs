//! HTTP surface.
//!
//! ## Example
//! ```no_run
//! use domain_banner::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().config(Config::default()).port(8080).build()?.run().await
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::OnceCell;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::brand::Theme;
use crate::config::Config;
use crate::domain::FALLBACK_HOST;
use crate::error::Error;
use crate::font::{FontError, FontRegistry, GlyphSource};
use crate::generate::{GenRequest, Generated, Generator, ImageKind, parse_size};
use crate::layout::DEFAULT_FAVICON_SIZE;
use crate::render::OutputFormat;

// ============================================================================
// Errors
// ============================================================================

/// Anything that turns a request into a 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Render(#[from] Error),

    #[error("render task failed: {0}")]
    Join(#[from] JoinError),
}

impl From<FontError> for AppError {
    fn from(err: FontError) -> Self {
        Self::Render(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "Generation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Gen error: {self}"),
        )
            .into_response()
    }
}

// ============================================================================
// State
// ============================================================================

pub type FontLoader = Arc<dyn Fn() -> Result<Arc<dyn GlyphSource>, FontError> + Send + Sync>;

/// Shared by every request. Fonts are loaded by the first request that needs
/// them; concurrent first requests wait for the same load.
#[derive(Clone)]
pub struct AppState {
    fonts: Arc<OnceCell<Arc<dyn GlyphSource>>>,
    loader: FontLoader,
    tagline: Arc<str>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let fonts = config.fonts.clone();
        let loader: FontLoader = Arc::new(move || -> Result<Arc<dyn GlyphSource>, FontError> {
            let registry = FontRegistry::load(&fonts)?;
            Ok(Arc::new(registry) as Arc<dyn GlyphSource>)
        });
        Self::with_loader(loader, &config.tagline)
    }

    pub fn with_loader(loader: FontLoader, tagline: &str) -> Self {
        Self {
            fonts: Arc::new(OnceCell::new()),
            loader,
            tagline: Arc::from(tagline),
        }
    }

    async fn font(&self) -> Result<Arc<dyn GlyphSource>, AppError> {
        let font = self
            .fonts
            .get_or_try_init(|| async {
                let loader = self.loader.clone();
                let font = tokio::task::spawn_blocking(move || loader()).await??;
                info!("Fonts ready");
                Ok::<_, AppError>(font)
            })
            .await?;
        Ok(font.clone())
    }

    async fn generate(&self, request: GenRequest) -> Result<Generated, AppError> {
        let font = self.font().await?;
        let tagline = self.tagline.clone();
        let generated = tokio::task::spawn_blocking(move || {
            Generator::new(font.as_ref(), &tagline).generate(&request)
        })
        .await??;
        Ok(generated)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/gen", get(gen_image))
        .route("/banner.png", get(banner_png))
        .route("/banner.svg", get(banner_svg))
        .route("/logo.png", get(logo_png))
        .route("/logo.svg", get(logo_svg))
        .route("/icon.ico", get(icon_file))
        .route("/favicon.ico", get(icon_file))
        .route("/icon.svg", get(icon_svg))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parameters of `/gen`.
#[derive(Debug, Default, Deserialize)]
struct GenQuery {
    logo: Option<String>,
    /// Theme: `light` or `dark`.
    format: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    style: Option<String>,
    size: Option<String>,
    /// Encoding: `png` or `svg`.
    output: Option<String>,
}

/// Parameters of the fixed-name image routes.
#[derive(Debug, Default, Deserialize)]
struct ImageQuery {
    domain: Option<String>,
    style: Option<String>,
    theme: Option<String>,
    size: Option<String>,
}

/// The explicit domain parameter, else the `Host` header, else `localhost`.
fn request_host(param: Option<String>, headers: &HeaderMap) -> String {
    param
        .filter(|p| !p.trim().is_empty())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}

fn image_response(generated: Generated) -> Response {
    (
        [
            (header::CONTENT_TYPE, generated.content_type),
            (header::CACHE_CONTROL, "no-store"),
        ],
        generated.bytes,
    )
        .into_response()
}

async fn gen_image(
    State(state): State<AppState>,
    Query(query): Query<GenQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let kind = match query.kind.as_deref().map(str::trim) {
        Some("only_logo") => ImageKind::Logo {
            size: parse_size(query.size.as_deref()),
        },
        _ => ImageKind::Banner,
    };
    let request = GenRequest::new(request_host(query.logo, &headers), kind)
        .with_format(OutputFormat::from_param(query.output.as_deref()))
        .with_style(query.style)
        .with_theme(Theme::from_param(query.format.as_deref()));

    Ok(image_response(state.generate(request).await?))
}

async fn fixed_route(
    state: AppState,
    query: ImageQuery,
    headers: &HeaderMap,
    kind: ImageKind,
    format: OutputFormat,
) -> Result<Response, AppError> {
    let request = GenRequest::new(request_host(query.domain, headers), kind)
        .with_format(format)
        .with_style(query.style)
        .with_theme(Theme::from_param(query.theme.as_deref()));

    Ok(image_response(state.generate(request).await?))
}

async fn banner_png(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    fixed_route(state, query, &headers, ImageKind::Banner, OutputFormat::Png).await
}

async fn banner_svg(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    fixed_route(state, query, &headers, ImageKind::Banner, OutputFormat::Svg).await
}

async fn logo_png(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let kind = ImageKind::Logo {
        size: parse_size(query.size.as_deref()),
    };
    fixed_route(state, query, &headers, kind, OutputFormat::Png).await
}

async fn logo_svg(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let kind = ImageKind::Logo {
        size: parse_size(query.size.as_deref()),
    };
    fixed_route(state, query, &headers, kind, OutputFormat::Svg).await
}

async fn icon_file(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    fixed_route(state, query, &headers, ImageKind::IconFile, OutputFormat::Png).await
}

async fn icon_svg(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let kind = ImageKind::Favicon {
        size: DEFAULT_FAVICON_SIZE,
    };
    fixed_route(state, query, &headers, kind, OutputFormat::Svg).await
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Domain banner</title>
<link rel="icon" href="/icon.svg" type="image/svg+xml">
<style>
body { font-family: Georgia, serif; margin: 2rem; background: #f5f5f7; color: #111; }
form { display: flex; gap: .5rem; margin-bottom: 1.5rem; }
img { display: block; max-width: 100%; margin-bottom: 1rem; background: #fff; }
.dark { background: #0b0d17; }
</style>
</head>
<body>
<form id="f">
<input name="logo" placeholder="example.com">
<select name="style"><option>netproxy</option><option>aurora</option><option>ocean</option><option>candy</option></select>
<button>Render</button>
</form>
<img id="light" alt="light banner">
<img id="dark" class="dark" alt="dark banner">
<img id="logo" width="256" height="256" alt="logo">
<script>
const f = document.getElementById("f");
function show() {
  const q = new URLSearchParams(new FormData(f));
  const t = Date.now();
  document.getElementById("light").src = "/gen?" + q + "&format=light&t=" + t;
  document.getElementById("dark").src = "/gen?" + q + "&format=dark&t=" + t;
  document.getElementById("logo").src = "/gen?" + q + "&type=only_logo&size=512&t=" + t;
}
f.addEventListener("submit", e => { e.preventDefault(); show(); });
show();
</script>
</body>
</html>
"#;

// ============================================================================
// Server
// ============================================================================

/// A fluent builder for configuring the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: Config,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Validates the configuration and prepares the shared state.
    ///
    /// # Errors
    /// Returns an error if a configured font directory does not exist.
    pub fn build(self) -> anyhow::Result<Server> {
        if let Some(dir) = &self.cfg.fonts.dir {
            if !dir.is_dir() {
                anyhow::bail!("Font directory not found at: {}", dir.display());
            }
        }

        let address = self.cfg.server.socket_addr();
        info!(%address, tagline = %self.cfg.tagline, "Initializing server");

        Ok(Server {
            address,
            state: AppState::new(&self.cfg),
        })
    }
}

/// A configured server ready to run.
#[must_use = "call .run().await to start the server"]
pub struct Server {
    address: SocketAddr,
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.address)
            .await
            .with_context(|| format!("Failed to bind {}", self.address))?;
        info!("Starting HTTP server on http://{}", self.address);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(async {
                if let Err(e) = shutdown_signal().await {
                    error!("Error while waiting for shutdown signal: {e}");
                    return;
                }
                info!("Shutdown signal received, starting graceful shutdown...");
            })
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderValue, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::font::BlockFont;
    use crate::layout::DEFAULT_TAGLINE;

    fn loader<F>(f: F) -> FontLoader
    where
        F: Fn() -> Result<Arc<BlockFont>, FontError> + Send + Sync + 'static,
    {
        Arc::new(move || f().map(|font| font as Arc<dyn GlyphSource>))
    }

    fn block_state() -> AppState {
        AppState::with_loader(loader(|| Ok(Arc::new(BlockFont))), DEFAULT_TAGLINE)
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
            .dimensions()
    }

    #[tokio::test]
    async fn gen_only_logo_png() {
        let (status, headers, body) = fetch(
            router(block_state()),
            "/gen?logo=netproxy.io&type=only_logo&size=128&style=aurora",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(png_dimensions(&body), (128, 128));
    }

    #[tokio::test]
    async fn gen_defaults_to_banner() {
        let (status, _, body) = fetch(router(block_state()), "/gen?logo=netproxy.io&format=dark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(png_dimensions(&body), (1466, 371));
    }

    #[tokio::test]
    async fn gen_svg_output() {
        let (status, headers, body) =
            fetch(router(block_state()), "/gen?logo=netproxy.io&output=svg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml; charset=utf-8");
        assert!(body.starts_with(b"<svg"));
    }

    #[tokio::test]
    async fn logo_size_is_clamped() {
        let (_, _, body) = fetch(router(block_state()), "/logo.png?domain=netproxy.io&size=12").await;
        assert_eq!(png_dimensions(&body), (64, 64));
    }

    #[tokio::test]
    async fn banner_svg_route() {
        let (status, headers, body) =
            fetch(router(block_state()), "/banner.svg?domain=netproxy.io&theme=dark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        let markup = String::from_utf8(body).unwrap();
        assert!(markup.contains(r##"fill="#FFFFFF""##));
    }

    #[tokio::test]
    async fn icon_routes() {
        for uri in ["/icon.ico", "/favicon.ico"] {
            let (status, headers, body) = fetch(router(block_state()), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(headers[header::CONTENT_TYPE], "image/x-icon");
            assert_eq!(&body[..6], &[0, 0, 1, 0, 6, 0]);
        }

        let (_, headers, body) = fetch(router(block_state()), "/icon.svg").await;
        assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml; charset=utf-8");
        assert!(String::from_utf8(body).unwrap().contains(r#"width="64" height="64""#));
    }

    #[tokio::test]
    async fn index_and_not_found() {
        let (status, headers, body) = fetch(router(block_state()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        assert!(String::from_utf8(body).unwrap().contains("/gen?"));

        let (status, _, body) = fetch(router(block_state()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"Not Found");
    }

    #[tokio::test]
    async fn font_failure_is_a_500() {
        let state = AppState::with_loader(loader(|| Err(FontError::NoMatch(900))), DEFAULT_TAGLINE);
        let (status, _, body) = fetch(router(state), "/banner.png").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8(body).unwrap().starts_with("Gen error: "));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fonts_load_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let state = AppState::with_loader(
            loader(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(20));
                Ok(Arc::new(BlockFont))
            }),
            DEFAULT_TAGLINE,
        );
        let app = router(state);

        let requests = (0..8).map(|_| fetch(app.clone(), "/icon.svg?domain=netproxy.io"));
        for (status, _, _) in spawn_all(requests).await {
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    async fn spawn_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handles: Vec<_> = futures.map(tokio::spawn).collect();
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    }

    #[test]
    fn host_fallback_order() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_host(None, &headers), "localhost");

        headers.insert(header::HOST, HeaderValue::from_static("shop.example.com:3001"));
        assert_eq!(request_host(None, &headers), "shop.example.com:3001");
        assert_eq!(request_host(Some("  ".into()), &headers), "shop.example.com:3001");
        assert_eq!(request_host(Some("netproxy.io".into()), &headers), "netproxy.io");
    }
}
