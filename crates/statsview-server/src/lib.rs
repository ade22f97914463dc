//! HTTP dashboard server for statsview.
//!
//! Mounts the dashboard page at [`PREFIX`] and one pull route per viewer at
//! `PREFIX/view/{route}`. All viewers share a single
//! [`StatsManager`], so a pull on any chart keeps every chart fresh.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use statsview_core::{
    ChartSpec, Config, ProcessProbe, StatsManager, StatsProbe, Viewer, viewers::all_viewers,
};

pub mod browser;
mod error;
pub mod page;

pub use error::ServerError;
pub use page::render_page;

/// Mount point of the dashboard and its pull routes.
pub const PREFIX: &str = "/debug/statsview";

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered list of viewers to serve. Registration order is display order.
#[derive(Clone, Default)]
pub struct Viewers {
    list: Vec<Arc<dyn Viewer>>,
}

impl Viewers {
    /// The built-in process viewers.
    pub fn default_viewers() -> Self {
        Self {
            list: all_viewers().into_iter().map(Arc::from).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a viewer. Duplicate route names are allowed; the last one
    /// registered answers the route.
    pub fn register(mut self, viewer: impl Viewer + 'static) -> Self {
        self.list.push(Arc::new(viewer));
        self
    }

    pub fn extend(mut self, viewers: impl IntoIterator<Item = Box<dyn Viewer>>) -> Self {
        self.list.extend(viewers.into_iter().map(Arc::from));
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.list.iter().map(|v| v.name().to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

/// Shared handler state.
struct AppState {
    routes: HashMap<String, Arc<dyn Viewer>>,
    page: String,
}

async fn handle_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn handle_view(
    State(state): State<Arc<AppState>>,
    Path(route): Path<String>,
) -> Response {
    let Some(viewer) = state.routes.get(&route) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(point) = viewer.serve() else {
        log::debug!("viewer {route} is not bound");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    match serde_json::to_vec(&point) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            log::debug!("serializing {route} point: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// ViewManager
// ---------------------------------------------------------------------------

/// Owns the scheduler, the viewers and the HTTP surface of one dashboard.
pub struct ViewManager {
    config: Arc<Config>,
    stats: Arc<StatsManager>,
    charts: Vec<ChartSpec>,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl ViewManager {
    /// Build a dashboard over the current process.
    pub fn new(config: Config, viewers: Viewers) -> Result<Self, ServerError> {
        Self::with_probe(config, viewers, Arc::new(ProcessProbe))
    }

    /// Build a dashboard with a custom statistics probe.
    pub fn with_probe(
        config: Config,
        viewers: Viewers,
        probe: Arc<dyn StatsProbe>,
    ) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let stats = StatsManager::with_probe(Arc::clone(&config), probe)?;

        let mut routes: HashMap<String, Arc<dyn Viewer>> = HashMap::new();
        let mut charts = Vec::with_capacity(viewers.len());
        for viewer in viewers.list {
            viewer.bind(Arc::clone(&stats));
            charts.push(viewer.chart());
            let name = viewer.name().to_string();
            if routes.insert(name.clone(), viewer).is_some() {
                log::warn!("duplicate viewer route '{name}', the last registration wins");
            }
        }

        let page = render_page(&config, &charts)?;
        Ok(Self {
            config,
            stats,
            charts,
            state: Arc::new(AppState { routes, page }),
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &Arc<StatsManager> {
        &self.stats
    }

    /// Charts in display order, one per registered viewer.
    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    /// The URL the dashboard is advertised at.
    pub fn dashboard_url(&self) -> String {
        format!("http://{}{PREFIX}", self.config.link_addr)
    }

    /// Token that stops the server and the scheduler when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The axum router serving the page and every pull route.
    pub fn router(&self) -> Router {
        Router::new()
            .route(PREFIX, get(handle_page))
            .route(&format!("{PREFIX}/view/{{route}}"), get(handle_view))
            .with_state(Arc::clone(&self.state))
    }

    /// Bind `listen_addr` and serve until [`stop`](Self::stop) is called.
    pub async fn run(&self) -> Result<(), ServerError> {
        let addr = self.config.listen_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until [`stop`](Self::stop).
    ///
    /// After cancellation, in-flight requests get at most `shutdown_grace`
    /// to finish before the server is dropped.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        let scheduler = self.stats.start(self.cancel.child_token())?;
        log::info!("statsview listening on http://{local}{PREFIX}");

        if self.config.auto_open_browser {
            browser::open(&self.dashboard_url());
        }

        let shutdown = self.cancel.clone();
        let app = self.router();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        let finished = tokio::select! {
            res = &mut server => Some(res),
            _ = self.cancel.cancelled() => None,
        };
        let result = match finished {
            Some(res) => res,
            None => {
                log::info!("statsview stopping");
                match tokio::time::timeout(self.config.shutdown_grace, &mut server).await {
                    Ok(res) => res,
                    Err(_) => {
                        log::warn!(
                            "in-flight requests still running after {:?}, dropping them",
                            self.config.shutdown_grace
                        );
                        server.abort();
                        Ok(Ok(()))
                    }
                }
            }
        };

        // The server may also exit on its own; the scheduler goes with it.
        self.cancel.cancel();
        if let Err(e) = scheduler.await {
            log::warn!("sampling scheduler task failed: {e}");
        }
        log::info!("statsview stopped");

        match result {
            Ok(served) => served.map_err(ServerError::Serve),
            Err(join) => Err(ServerError::Serve(std::io::Error::other(join))),
        }
    }

    /// Stop accepting connections and stop sampling.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
