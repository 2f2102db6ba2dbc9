//! HTTP transport for irradiate-council
//!
//! Axum router serving the JSON evaluation endpoint, the server-rendered
//! report pages and the login gate. Health is plain text.

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Form, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{CouncilError, GENERIC_FAILURE_MESSAGE},
    evaluate::Evaluator,
    gate::{self, GatePassword},
    report::{
        ReportView,
        html::{render_form, render_report},
    },
    schemas::EvaluateRequest,
};

/// Shared state for the HTTP server. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub evaluator: Evaluator,
    pub password: GatePassword,
}

impl AppState {
    pub fn new(config: Arc<Config>, evaluator: Evaluator) -> Self {
        let password = GatePassword::new(config.runtime.login_password.clone());
        Self {
            config,
            evaluator,
            password,
        }
    }
}

impl FromRef<AppState> for GatePassword {
    fn from_ref(state: &AppState) -> Self {
        state.password.clone()
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Response header carrying the id of the `evaluate` span
pub const EVALUATION_ID_HEADER: &str = "x-evaluation-id";

/// `POST /api/evaluate`: the raw model object on success
pub async fn evaluate_handler(
    State(state): State<AppState>,
    body: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Response, CouncilError> {
    let max_chars = state.evaluator.settings().max_chars;
    let Json(request) = body.map_err(|rejection| body_error(rejection, max_chars))?;
    let evaluation = state.evaluator.evaluate(&request.input_text).await?;
    Ok((
        [(EVALUATION_ID_HEADER, evaluation.id.to_string())],
        Json(evaluation.raw),
    )
        .into_response())
}

/// An unreadable body is reported as missing text, except one that was cut
/// off by the body size limit.
fn body_error(rejection: JsonRejection, max_chars: usize) -> CouncilError {
    tracing::warn!(
        status = %rejection.status(),
        "rejected request body: {}",
        rejection.body_text()
    );
    match rejection {
        JsonRejection::BytesRejection(_) => CouncilError::BodyTooLarge { max: max_chars },
        _ => CouncilError::EmptyInput,
    }
}

pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_form(
        "",
        None,
        state.evaluator.settings().max_chars,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReportForm {
    #[serde(rename = "inputText", default)]
    pub input_text: String,
}

/// `POST /report`: run the pipeline and render the report, or the form
/// again with the error and the input kept.
pub async fn report_handler(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let max_chars = state.evaluator.settings().max_chars;
    match state.evaluator.evaluate(&form.input_text).await {
        Ok(evaluation) => (
            [(EVALUATION_ID_HEADER, evaluation.id.to_string())],
            Html(render_report(&ReportView::from_value(&evaluation.raw))),
        )
            .into_response(),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(error = %err, "report failed");
            }
            let page = render_form(&form.input_text, Some(&err.user_message()), max_chars);
            (status, Html(page)).into_response()
        }
    }
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::error!("request exceeded the server timeout");
    } else {
        tracing::error!("unhandled middleware error: {}", err);
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": GENERIC_FAILURE_MESSAGE })),
    )
        .into_response()
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_millis(state.config.server.request_timeout_ms);

    Router::new()
        .route("/", get(index_handler))
        .route("/report", post(report_handler))
        .route("/login", get(gate::login_page).post(gate::login_submit))
        .route("/api/evaluate", post(evaluate_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.password.clone(),
            gate::require_password,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(timeout),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: AppState) -> anyhow::Result<()> {
    let bind = state.config.server.http_bind;
    if state.password.0.is_none() {
        tracing::error!("LOGIN_PASSWORD environment variable is not set; report pages are open");
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
