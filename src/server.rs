//! Demo HTTP host for a single chatbox.
//!
//! Plays the part of both the embedding page and the network layer: the page
//! polls the pane contents with HTMX, the form posts to the submit endpoint,
//! and `/chat/events` lets other tools inject `say`/`join`/`leave` events.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chatbox::Chatbox;
use crate::config::AppConfig;
use crate::events::InboundEvent;
use crate::history::HtmlPane;
use crate::network::LocalNetwork;
use crate::router::SubmitOutcome;
use crate::world::{Entity, EntityRegistry};

/// Entity id of the player sitting at this chatbox.
pub const LOCAL_ENTITY_ID: &str = "local";

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one chatbox this server hosts. The mutex serializes every call
    /// into it.
    pub chatbox: Arc<Mutex<Chatbox<HtmlPane>>>,
    pub network: LocalNetwork,
    pub world: EntityRegistry,
}

impl AppState {
    /// Build a world with the local player in it, connected and echoing.
    pub fn new(config: &AppConfig) -> crate::error::Result<Self> {
        let world = EntityRegistry::new();
        world.insert(LOCAL_ENTITY_ID, Entity::new(config.server.local_nick.clone()));

        let network = LocalNetwork::new();
        network.echo_as(LOCAL_ENTITY_ID);
        network.set_connected(true);

        let chatbox = Chatbox::new(
            &config.chatbox,
            HtmlPane::new(),
            Arc::new(world.clone()),
            Arc::new(network.clone()),
        )?;

        Ok(Self {
            chatbox: Arc::new(Mutex::new(chatbox)),
            network,
            world,
        })
    }
}

/// Build the router for `state`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat/lines", get(lines_handler))
        .route("/chat/submit", post(submit_handler))
        .route("/chat/events", post(events_handler))
        .route("/chat/connection", post(connection_handler))
        .route("/chat/transcript", get(transcript_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::new(&config)?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        capacity = config.chatbox.history_capacity,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

fn html_shell(widget: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>frochat</title>
    <script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js"></script>
    <link rel="stylesheet" href="/static/chatbox.css">
</head>
<body>
    <div id="game">
        {widget}
    </div>
    <div hx-get="/chat/lines" hx-trigger="load, every 1s" hx-target=".frojs-chatbox .scroll-pane" hx-swap="innerHTML"></div>
    <script>
        document.querySelector('.frojs-chatbox input').addEventListener('keypress', (e) => {{
            if (e.key !== 'Enter') return;
            htmx.ajax('POST', '/chat/submit', {{ values: {{ message: e.target.value }}, swap: 'none' }})
                .then(() => htmx.trigger('[hx-get="/chat/lines"]', 'load'));
        }});
    </script>
</body>
</html>"#
    )
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let chatbox = state.chatbox.lock().await;
    Html(html_shell(&chatbox.markup()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /chat/lines - Current pane contents.
async fn lines_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut chatbox = state.chatbox.lock().await;
    chatbox.pump();
    Html(chatbox.history().pane().inner_html())
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    /// What is left in the input box.
    pub input: String,
}

/// POST /chat/submit - Submit a line as the local player.
async fn submit_handler(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Json<SubmitResponse> {
    let mut chatbox = state.chatbox.lock().await;
    chatbox.type_text(&form.message);
    let outcome = chatbox.press_enter();
    chatbox.pump();

    // The page owns its input box; tell it what to keep and start the next
    // post from scratch.
    let input = chatbox.input().value().to_string();
    chatbox.clear_input();
    Json(SubmitResponse { outcome, input })
}

/// POST /chat/events - Inject a network event.
async fn events_handler(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> StatusCode {
    state.network.deliver(event);
    state.chatbox.lock().await.pump();
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize)]
struct ConnectionRequest {
    connected: bool,
}

/// POST /chat/connection - Toggle the simulated connection.
async fn connection_handler(
    State(state): State<AppState>,
    Json(req): Json<ConnectionRequest>,
) -> StatusCode {
    state.network.set_connected(req.connected);
    StatusCode::NO_CONTENT
}

/// GET /chat/transcript - "Save Chat" export.
async fn transcript_handler(State(state): State<AppState>) -> impl IntoResponse {
    let transcript = state.chatbox.lock().await.save_chat();
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chat.txt\"",
            ),
        ],
        transcript,
    )
}
