//! Webhook server for receiving WhatsApp messages from Twilio
//!
//! Thin translation layer: decode the Twilio form payload, hand the text
//! to the session engine, wrap the single reply in TwiML. All behavior
//! lives in the engine; this file must stay transport-only.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, warn};

use shamba_core::{Channel, Engine};

use crate::error::{Result, WhatsAppError};
use crate::twilio::verify_signature;

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub engine: Arc<Engine>,
    /// Twilio auth token; empty disables signature verification
    pub auth_token: String,
    /// Public URL Twilio signs requests against
    pub webhook_url: Option<String>,
    /// Allowed sender numbers; empty = open
    pub admin_numbers: Vec<String>,
}

/// Webhook server
pub struct WebhookServer {
    addr: SocketAddr,
    state: WebhookState,
}

impl WebhookServer {
    /// Create a new webhook server
    pub fn new(
        addr: SocketAddr,
        engine: Arc<Engine>,
        auth_token: String,
        webhook_url: Option<String>,
        admin_numbers: Vec<String>,
    ) -> Self {
        let state = WebhookState {
            engine,
            auth_token,
            webhook_url,
            admin_numbers,
        };

        Self { addr, state }
    }

    /// Start the webhook server
    pub async fn start(self) -> Result<()> {
        info!("Starting WhatsApp webhook server on {}", self.addr);

        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| WhatsAppError::Config(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| WhatsAppError::Http(e.to_string()))?;

        Ok(())
    }
}

fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook/whatsapp", post(handle_webhook))
        .route("/health", get(health))
        .route("/", get(root))
        .with_state(Arc::new(state))
}

/// Handle an incoming Twilio webhook POST
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    if !state.auth_token.is_empty() {
        if let Some(url) = &state.webhook_url {
            let signature = headers
                .get("X-Twilio-Signature")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if !verify_signature(&state.auth_token, url, &params, signature) {
                warn!("Rejected webhook with bad signature");
                return (StatusCode::FORBIDDEN, [(header::CONTENT_TYPE, "text/plain")],
                    "Forbidden".to_string());
            }
        }
    }

    let field = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    };

    let from = field("From");
    let phone = from.strip_prefix("whatsapp:").unwrap_or(from).to_string();
    let body = field("Body").trim().to_string();

    if !state.admin_numbers.is_empty() && !state.admin_numbers.contains(&phone) {
        warn!("Rejected message from unauthorized number {}", phone);
        return (StatusCode::FORBIDDEN, [(header::CONTENT_TYPE, "text/plain")],
            "Unauthorized".to_string());
    }

    if phone.is_empty() || body.is_empty() {
        return (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], twiml(None));
    }

    let reply = state.engine.handle_message(&phone, &body, Channel::Webhook).await;

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], twiml(Some(&reply)))
}

/// Health endpoint with the live session count
async fn health(State(state): State<Arc<WebhookState>>) -> impl IntoResponse {
    let active_sessions = state.engine.session_count().await;
    Json(json!({
        "status": "healthy",
        "active_sessions": active_sessions,
    }))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "ShambaBot WhatsApp gateway",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Wrap a reply in a TwiML messaging response.
fn twiml(message: Option<&str>) -> String {
    match message {
        Some(text) => format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
            escape_xml(text)
        ),
        None => "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
