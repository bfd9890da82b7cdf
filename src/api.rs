//! Single-page web shell for the chatbot.
//!
//! Serves an embedded chat page and a small JSON API. Conversation memory is
//! keyed per session id, so concurrent users never share a context window.
//! Switching the language selector clears that session's memory, mirroring
//! the CLI's language-change behavior.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::chat::ChatProvider;
use crate::error::ChatbotError;
use crate::language::{self, SupportedLanguage};
use crate::session::{ChatSession, TurnRequest};
use crate::translate::Translator;

const INDEX_HTML: &str = include_str!("static/index.html");

/// Sessions retained before the idlest one is evicted to make room.
const DEFAULT_MAX_SESSIONS: usize = 1024;

struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_used: std::time::Instant,
}

/// Shared server state: capability handles plus the per-session map.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn ChatProvider>,
    translator: Translator,
    window: usize,
    max_sessions: usize,
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ChatProvider>, translator: Translator, window: usize) -> Self {
        Self {
            provider,
            translator,
            window,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Fetches or creates the session, holding the map lock only for that.
    /// When the map is full, the session idle the longest makes room.
    async fn checkout(&self, session_id: Uuid) -> Arc<Mutex<ChatSession>> {
        let mut sessions = self.sessions.lock().await;

        if !sessions.contains_key(&session_id) && sessions.len() >= self.max_sessions {
            let idlest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            if let Some(id) = idlest {
                sessions.remove(&id);
            }
        }

        let entry = sessions.entry(session_id).or_insert_with(|| SessionEntry {
            session: Arc::new(Mutex::new(
                ChatSession::new(self.provider.clone(), self.translator.clone())
                    .with_window(self.window),
            )),
            last_used: std::time::Instant::now(),
        });
        entry.last_used = std::time::Instant::now();
        entry.session.clone()
    }

    /// Runs one turn for the given (or a fresh) session.
    ///
    /// Only the session's own lock is held across the external calls, so a
    /// slow upstream turn never stalls other sessions.
    async fn turn(&self, request: ChatApiRequest) -> Result<ChatApiResponse, ChatbotError> {
        let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

        let session = self.checkout(session_id).await;
        let mut session = session.lock().await;

        // The selector is explicit here; a change wipes the window.
        session.set_language(request.language);

        let result = session
            .process_turn(TurnRequest::new(request.message).with_language(request.language))
            .await?;

        Ok(ChatApiResponse {
            session_id,
            reply: result.display_text,
            language: result.language,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    /// Omitted on the first message; the server assigns one
    pub session_id: Option<Uuid>,
    pub message: String,
    #[serde(default)]
    pub language: SupportedLanguage,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub language: SupportedLanguage,
}

#[derive(Debug, Deserialize)]
pub struct GreetingParams {
    #[serde(default)]
    pub language: SupportedLanguage,
}

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub greeting: &'static str,
    pub language: SupportedLanguage,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn greeting(Query(params): Query<GreetingParams>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        greeting: language::greeting(params.language),
        language: params.language,
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "message must not be empty".to_string(),
            }),
        ));
    }

    state.turn(request).await.map(Json).map_err(|e| {
        log::error!("turn failed: {e}");
        let status = match &e {
            ChatbotError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ChatbotError::AuthError(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorBody { error: e.to_string() }))
    })
}

/// Builds the router: the embedded page plus the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/greeting", get(greeting))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the chat UI until the process exits.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ChatbotError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ChatbotError::Generic(format!("failed to bind {addr}: {e}")))?;
    log::info!("chat UI listening on http://{addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| ChatbotError::Generic(format!("server error: {e}")))
}
