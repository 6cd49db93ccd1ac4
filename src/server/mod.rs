//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::Generator;
use crate::templates::STYLESHEET;
use crate::{Site, CONFIG_FILE};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    generator: Generator,
    public_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Build the application router. Pages are rendered from disk on every
/// request.
pub fn app(site: &Site, live_reload: bool) -> Result<(Router, broadcast::Sender<()>)> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        generator: Generator::new(site)?,
        public_dir: site.public_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload,
    });

    let pages = Router::new()
        .route("/", get(index_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/style.css", get(stylesheet_handler))
        .fallback(fallback_handler)
        .with_state(state.clone());

    let root = site.config.root_path();
    let root = root.trim_end_matches('/');
    let pages = if root.is_empty() {
        pages
    } else {
        Router::new().nest(root, pages)
    };

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .with_state(state)
        .merge(pages)
        .layer(TraceLayer::new_for_http());

    Ok((app, reload_tx))
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (app, reload_tx) = app(site, watch)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, site.config.root_path());
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&site, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch posts, public assets and config, telling clients to reload
fn watch_and_reload(site: &Site, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for dir in [&site.posts_dir, &site.public_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                    if event.path.ends_with(CONFIG_FILE) {
                        tracing::warn!("Configuration changed; restart the server to apply it");
                    }
                }

                // No receivers just means no browser is connected
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// `GET /` - post listing
async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let result = render(state.clone(), |generator| generator.index_html()).await;
    match result {
        Ok(html) => page(&state, StatusCode::OK, html),
        Err(e) => server_error(e),
    }
}

/// `GET /posts/:slug` - single post, 404 when it has no backing file
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let result = render(state.clone(), move |generator| generator.post_html(&slug)).await;
    match result {
        Ok(Some(html)) => page(&state, StatusCode::OK, html),
        Ok(None) => not_found(&state),
        Err(e) => server_error(e),
    }
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Serve files from the public directory (cover images, etc.)
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.public_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(e) => server_error(e.into()),
    }
}

/// Run blocking page rendering off the async runtime
async fn render<T, F>(state: Arc<ServerState>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Generator) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.generator)).await?
}

fn page(state: &ServerState, status: StatusCode, html: String) -> Response {
    let html = if state.live_reload {
        inject_live_reload(&html)
    } else {
        html
    };
    (status, Html(html)).into_response()
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.not_found_html() {
        Ok(html) => page(state, StatusCode::NOT_FOUND, html),
        Err(e) => server_error(e),
    }
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("first.md"),
            "---\ntitle: First Post\ndate: 2024-06-01\n---\nHello *there*",
        )
        .unwrap();
        fs::write(
            posts.join("second.md"),
            "---\ntitle: Second Post\ndate: 2024-06-02\n---\nAgain",
        )
        .unwrap();
        let images = dir.path().join("public/images/posts");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("first.jpg"), "jpeg bytes").unwrap();

        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_index_lists_newest_first() {
        let (_dir, site) = site();
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.find("Second Post").unwrap() < body.find("First Post").unwrap());
        assert!(body.contains(r#"src="/images/posts/first.jpg""#));
        assert!(!body.contains("__livereload"));
    }

    #[tokio::test]
    async fn test_post_page() {
        let (_dir, site) = site();
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app, "/posts/first").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<em>there</em>"));
        assert!(body.contains("First Post — log file"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let (_dir, site) = site();
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app, "/posts/missing-post").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("This page could not be found."));
    }

    #[tokio::test]
    async fn test_traversal_slug_is_404() {
        let (dir, site) = site();
        fs::write(dir.path().join("secret.md"), "---\ntitle: Secret\n---\n").unwrap();
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app, "/posts/..%2Fsecret").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.contains("Secret"));
    }

    #[tokio::test]
    async fn test_malformed_post_is_500() {
        let (_dir, site) = site();
        fs::write(site.posts_dir.join("broken.md"), "---\ntitle: [oops\n---\n").unwrap();
        let (app, _) = app(&site, false).unwrap();

        let (status, _) = get(app, "/posts/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_static_assets() {
        let (_dir, site) = site();
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app.clone(), "/images/posts/first.jpg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "jpeg bytes");

        let (status, body) = get(app.clone(), "/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("data-theme"));

        let (status, _) = get(app, "/nope.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_live_reload_injected() {
        let (_dir, site) = site();
        let (app, _) = app(&site, true).unwrap();

        let (_, body) = get(app, "/").await;
        assert!(body.contains("/__livereload"));
        assert_eq!(body.matches("</body>").count(), 1);
    }

    #[tokio::test]
    async fn test_nested_under_root() {
        let (dir, mut site) = site();
        site.config.root = "/blog/".to_string();
        let site = Site::with_config(dir.path().to_path_buf(), site.config);
        let (app, _) = app(&site, false).unwrap();

        let (status, body) = get(app.clone(), "/blog/posts/second").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/blog/style.css""#));

        let (status, _) = get(app, "/posts/second").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = "<html><body>Hi</body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("__livereload"));
        assert!(injected.ends_with("</html>"));
    }
}
