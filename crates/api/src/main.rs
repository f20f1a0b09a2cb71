use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savvystock_core::domain::advisor::{Advisor, RiskLevel, TimeHorizon};
use savvystock_core::domain::instrument::{IndexRecord, Stock};
use savvystock_core::domain::news::{category_color, NewsItem};
use savvystock_core::market::jitter::{jitter_index, jitter_stock, ThreadRandom};
use savvystock_core::market::provider::{MarketDataProvider, MockMarketProvider};
use savvystock_core::market::{find_by_symbol, find_index_by_symbol};
use savvystock_core::report::{describe_allocation, ReportLine};
use savvystock_core::session::storage::FileSessionStorage;
use savvystock_core::session::{Session, SessionManager, ValidationError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = savvystock_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let advisor = Advisor::load()?;
    let provider = MockMarketProvider::from_env()?;

    // Seed the live board once up front; the refresh loops take over from here.
    let indices = provider.fetch_indices().await?;
    let stocks = provider.fetch_trending_stocks().await?;

    let sessions = SessionManager::new(Arc::new(FileSessionStorage::new(settings.session_file())));

    let state = AppState {
        advisor: Arc::new(advisor),
        provider: Arc::new(provider),
        indices: Arc::new(RwLock::new(indices)),
        stocks: Arc::new(RwLock::new(stocks)),
        sessions: Arc::new(sessions),
    };

    let refresh = RefreshOptions::from_env();
    spawn_refresh_loops(state.clone(), refresh);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/market/indices", get(get_indices))
        .route("/market/indices/:symbol", get(get_index))
        .route("/market/stocks", get(get_stocks))
        .route("/market/stocks/:symbol", get(get_stock))
        .route("/news", get(get_news))
        .route("/recommendations", get(get_recommendation))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/session", get(get_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    advisor: Arc<Advisor>,
    provider: Arc<MockMarketProvider>,
    indices: Arc<RwLock<Vec<IndexRecord>>>,
    stocks: Arc<RwLock<Vec<Stock>>>,
    sessions: Arc<SessionManager>,
}

#[derive(Debug, Clone)]
struct RefreshOptions {
    /// Seconds between index board ticks.
    indices_secs: u64,
    /// Seconds between trending-stock ticks.
    stocks_secs: u64,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            indices_secs: 5,
            stocks_secs: 30,
        }
    }
}

impl RefreshOptions {
    fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("INDICES_REFRESH_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                out.indices_secs = n.max(1);
            }
        }

        if let Ok(s) = std::env::var("STOCKS_REFRESH_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                out.stocks_secs = n.max(1);
            }
        }

        out
    }
}

// Each board has its own independent loop and an "already refreshing" flag
// checked before a tick starts. Mutation happens between discrete ticks;
// readers only ever see a complete board.
fn spawn_refresh_loops(state: AppState, opts: RefreshOptions) {
    let indices_state = state.clone();
    tokio::spawn(async move {
        let refreshing = AtomicBool::new(false);
        let mut tick = tokio::time::interval(Duration::from_secs(opts.indices_secs));
        tick.tick().await;
        loop {
            tick.tick().await;
            if refreshing.swap(true, Ordering::SeqCst) {
                tracing::debug!("index refresh already in progress; skipping tick");
                continue;
            }

            let mut rng = ThreadRandom;
            let current = indices_state.indices.read().await.clone();
            let mut next = Vec::with_capacity(current.len());
            for index in &current {
                match jitter_index(index, &mut rng) {
                    Ok(n) => next.push(n),
                    Err(e) => {
                        tracing::error!(symbol = %index.symbol, error = %e, "index tick failed; keeping previous state");
                        next.push(index.clone());
                    }
                }
            }
            *indices_state.indices.write().await = next;

            refreshing.store(false, Ordering::SeqCst);
        }
    });

    let stocks_state = state;
    tokio::spawn(async move {
        let refreshing = AtomicBool::new(false);
        let mut tick = tokio::time::interval(Duration::from_secs(opts.stocks_secs));
        tick.tick().await;
        loop {
            tick.tick().await;
            if refreshing.swap(true, Ordering::SeqCst) {
                tracing::debug!("stock refresh already in progress; skipping tick");
                continue;
            }

            let mut rng = ThreadRandom;
            let current = stocks_state.stocks.read().await.clone();
            let mut next = Vec::with_capacity(current.len());
            for stock in &current {
                match jitter_stock(stock, &mut rng) {
                    Ok(n) => next.push(n),
                    Err(e) => {
                        tracing::error!(symbol = %stock.symbol, error = %e, "stock tick failed; keeping previous state");
                        next.push(stock.clone());
                    }
                }
            }
            *stocks_state.stocks.write().await = next;

            refreshing.store(false, Ordering::SeqCst);
        }
    });
}

async fn get_indices(State(state): State<AppState>) -> Json<Vec<IndexRecord>> {
    Json(state.indices.read().await.clone())
}

async fn get_index(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<IndexRecord>, StatusCode> {
    let indices = state.indices.read().await;
    find_index_by_symbol(&indices, &symbol)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_stocks(State(state): State<AppState>) -> Json<Vec<Stock>> {
    Json(state.stocks.read().await.clone())
}

async fn get_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Stock>, StatusCode> {
    // Details come from the provider (catalog baseline) and carry its
    // simulated latency; the live board is only a fallback.
    let details = state
        .provider
        .fetch_stock_details(&symbol)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match details {
        Some(stock) => Ok(Json(stock)),
        None => {
            let stocks = state.stocks.read().await;
            find_by_symbol(&stocks, &symbol)
                .cloned()
                .map(Json)
                .ok_or(StatusCode::NOT_FOUND)
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiNewsItem {
    #[serde(flatten)]
    item: NewsItem,
    color: &'static str,
}

async fn get_news(State(state): State<AppState>) -> Json<Vec<ApiNewsItem>> {
    // A failed fetch degrades to an empty feed; never fatal.
    let items = match state.provider.fetch_financial_news().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %e, "news fetch failed; serving empty feed");
            sentry_anyhow::capture_anyhow(&e);
            Vec::new()
        }
    };

    let items = items
        .into_iter()
        .map(|item| ApiNewsItem {
            color: category_color(&item.category),
            item,
        })
        .collect();
    Json(items)
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    risk: String,
    horizon: String,
}

#[derive(Debug, Serialize)]
struct ApiRecommendation {
    risk: &'static str,
    time_horizon: &'static str,
    title: String,
    description: String,
    allocation: Vec<ReportLine>,
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<ApiRecommendation>, StatusCode> {
    let risk: RiskLevel = params.risk.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let horizon: TimeHorizon = params
        .horizon
        .parse()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let rec = state.advisor.resolve(risk, horizon);

    Ok(Json(ApiRecommendation {
        risk: risk.label(),
        time_horizon: horizon.label(),
        title: rec.title.clone(),
        description: rec.description.clone(),
        allocation: describe_allocation(rec),
    }))
}

#[derive(Debug, Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignUpBody {
    email: String,
    password: String,
    full_name: String,
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: &'static str,
    detail: String,
}

type AuthFailure = (StatusCode, Json<FieldError>);

fn auth_failure(err: anyhow::Error) -> AuthFailure {
    if let Some(v) = err.downcast_ref::<ValidationError>() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(FieldError {
                field: v.field,
                detail: v.detail.clone(),
            }),
        );
    }

    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "auth operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FieldError {
            field: "form",
            detail: "internal error".to_string(),
        }),
    )
}

async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInBody>,
) -> Result<Json<Session>, AuthFailure> {
    state
        .sessions
        .sign_in(&body.email, &body.password)
        .map(Json)
        .map_err(auth_failure)
}

async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<Json<Session>, AuthFailure> {
    state
        .sessions
        .sign_up(&body.email, &body.password, &body.full_name)
        .map(Json)
        .map_err(auth_failure)
}

async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    state.sessions.sign_out().map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_session(State(state): State<AppState>) -> Result<Json<Session>, StatusCode> {
    let session = state.sessions.current().map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    session.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &savvystock_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
