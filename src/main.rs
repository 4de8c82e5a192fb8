mod alert;
mod config;
mod relay;
mod twilio;
mod types;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use config::Config;
use relay::{relay, Dispatcher, RelayError, RelayResponse};
use std::sync::Arc;
use tracing::{error, info, warn};
use types::InboundEvent;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulsetic_sms=info".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.dry_run {
        warn!("DRY_RUN mode enabled - SMS will be logged, NOT sent");
    }
    info!("Loaded configuration: {:?}", config);

    let state = AppState {
        dispatcher: Arc::new(Dispatcher::from_config(&config)),
        config: Arc::new(config),
    };
    let port = state.config.port;

    let app = router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/pulsetic/webhook", post(webhook_handler))
        .route("/invoke", post(invoke_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Pulsetic posts its payload directly; the request body is the event body.
async fn webhook_handler(State(state): State<AppState>, body: axum::body::Bytes) -> RelayResponse {
    info!("Received event: {}", String::from_utf8_lossy(&body));

    let event = match InboundEvent::from_raw(body.to_vec()) {
        Ok(event) => event,
        Err(err) => {
            error!("Error processing Pulsetic alert: {}", err);
            return RelayResponse::failed(&err);
        }
    };
    relay(event, &state.config, state.dispatcher.as_ref()).await
}

/// Takes a whole event envelope `{"body": ...}` where the body is either JSON
/// text or an already decoded object.
async fn invoke_handler(State(state): State<AppState>, body: axum::body::Bytes) -> RelayResponse {
    info!("Received event: {}", String::from_utf8_lossy(&body));

    let event: InboundEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            let err = RelayError::MalformedPayload(e.to_string());
            error!("Error processing Pulsetic alert: {}", err);
            return RelayResponse::failed(&err);
        }
    };
    relay(event, &state.config, state.dispatcher.as_ref()).await
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
