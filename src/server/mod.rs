//! The HTTP surface: one UI page and three JSON proxy endpoints

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, get_service, post},
};
use explorer_gemini::{GeminiLayer, GeminiService};
use explorer_graphql::{NerdGraphLayer, NerdGraphService};
use explorer_http::{
    HttpService, HttpServiceConfig, ReqwestService,
    error_on_status::{ErrorOnStatus, ErrorOnStatusLayer},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};

pub mod config;
pub mod graphql;
pub mod insights;
pub mod static_asset;

pub use config::ProxyConfig;

/// Log exports can be large; the default axum limit of 2MB is too small for them
const REQUEST_BODY_SIZE_LIMIT: usize = 64 * 1024 * 1024;

type NerdGraphClient = NerdGraphService<ErrorOnStatus<HttpService>>;
type GeminiClient = GeminiService<ErrorOnStatus<HttpService>>;

/// Shared by every handler; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    config: Arc<ProxyConfig>,
    nerdgraph: NerdGraphClient,
    gemini: GeminiClient,
}

impl AppState {
    /// Builds both upstream clients over one connection pool, each with its own timeout
    pub fn new(config: ProxyConfig) -> Result<AppState, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        let nerdgraph_http = ReqwestService::builder()
            .config(
                HttpServiceConfig::builder()
                    .timeout(*config.upstream_timeout())
                    .build(),
            )
            .client(client.clone())
            .build()?;
        let gemini_http = ReqwestService::builder()
            .config(HttpServiceConfig::builder().timeout(*config.ai_timeout()).build())
            .client(client)
            .build()?;
        Ok(AppState::with_http_services(
            config,
            nerdgraph_http.into(),
            gemini_http.into(),
        ))
    }

    /// Wires the upstream clients on top of arbitrary HTTP services
    pub fn with_http_services(
        config: ProxyConfig,
        nerdgraph_http: HttpService,
        gemini_http: HttpService,
    ) -> AppState {
        let nerdgraph = ServiceBuilder::new()
            .layer(NerdGraphLayer::new(config.nerdgraph_url().clone()))
            .layer(ErrorOnStatusLayer::new())
            .service(nerdgraph_http);
        let gemini = ServiceBuilder::new()
            .layer(GeminiLayer::new(
                config.gemini_url().clone(),
                config.gemini_model().clone(),
            ))
            .layer(ErrorOnStatusLayer::new())
            .service(gemini_http);
        AppState {
            config: Arc::new(config),
            nerdgraph,
            gemini,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub(crate) fn nerdgraph(&self) -> NerdGraphClient {
        self.nerdgraph.clone()
    }

    pub(crate) fn gemini(&self) -> GeminiClient {
        self.gemini.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let root = match state.config().html_file() {
        Some(path) => Router::new().route("/", get_service(ServeFile::new(path))),
        None => Router::new().route("/", get(static_asset::missing)),
    };

    Router::new()
        .route("/query", post(graphql::query))
        .route("/account-name", post(graphql::account_name))
        .route("/gemini-insights", post(insights::gemini_insights))
        .with_state(state)
        .merge(root)
        .layer(DefaultBodyLimit::max(REQUEST_BODY_SIZE_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serves until ctrl-c or SIGTERM, letting in-flight requests finish
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("could not listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("could not listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
