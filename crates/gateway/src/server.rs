use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Json, Router,
        extract::{Path, Query, State, WebSocketUpgrade},
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::{Value, json},
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    parley_media::MediaArtifact,
    parley_provider::ChatSummary,
    parley_store::MessageRecord,
};

use crate::{
    error::ApiError,
    outbound::{SendRequest, dispatch},
    state::GatewayState,
    ws::handle_connection,
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_upgrade_handler))
        .route("/send", post(send_handler))
        .route("/messages", get(messages_handler))
        .route("/messages/search", get(search_handler))
        .route("/media/{id}", get(media_handler))
        .route("/chats", get(chats_handler))
        .layer(cors)
        .with_state(AppState { gateway: state })
}

/// Bind and serve until the task is cancelled.
pub async fn run(state: Arc<GatewayState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_gateway_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn ws_upgrade_handler(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, app.gateway))
}

/// `POST /send` — validate, dispatch to the provider, persist.
async fn send_handler(
    State(app): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<Value>, ApiError> {
    dispatch(
        app.gateway.provider.as_ref(),
        app.gateway.log.as_ref(),
        request,
    )
    .await?;
    Ok(Json(json!({ "status": "sent" })))
}

/// `GET /messages` — the full record log in insertion order.
async fn messages_handler(State(app): State<AppState>) -> Json<Vec<MessageRecord>> {
    Json(app.gateway.log.all().await)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    q: String,
    chat: Option<String>,
    limit: Option<usize>,
}

/// `GET /messages/search?q=&chat=&limit=`
async fn search_handler(
    State(app): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<MessageRecord>> {
    Json(
        app.gateway
            .log
            .search(&query.q, query.chat.as_deref(), query.limit)
            .await,
    )
}

/// `GET /media/{id}` — the media artifact of one record.
async fn media_handler(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MediaArtifact>, ApiError> {
    app.gateway
        .log
        .find_by_id(&id)
        .await
        .and_then(|record| record.media)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `GET /chats` — conversations known to the provider session.
async fn chats_handler(State(app): State<AppState>) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let chats = app.gateway.provider.get_chats().await?;
    Ok(Json(chats))
}
