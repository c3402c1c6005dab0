// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use staffing_api::{
    ApiError, ApplicationResponse, AssignmentEngine, AssignmentResponse, EngineConfig,
    FulfillmentResponse, OwnerOrAdminPolicy, PostingResponse, StoreMaterializer,
};
use staffing_domain::{
    ActorId, ApplicationId, DEFAULT_DATE_LABEL_CAPACITY, PostingId, SelectionItem,
};
use staffing_persistence::{
    DEFAULT_MAX_ATTEMPTS, DocumentStore, InMemoryStore, RetryPolicy, SqliteStore,
};
use std::sync::Arc;
use time::UtcOffset;
use tracing::{error, info};

/// Staffing Server - HTTP server for the staffing assignment engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an in-memory store.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Actor allowed to edit every posting (repeatable)
    #[arg(long = "admin")]
    admins: Vec<String>,

    /// Attempts per transaction before reporting a write conflict
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Offset from UTC, in hours, used to turn stored timestamps into dates
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset_hours: i8,

    /// Number of date labels kept in memory
    #[arg(long, default_value_t = DEFAULT_DATE_LABEL_CAPACITY)]
    date_label_cache: usize,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The assignment engine.
    engine: Arc<AssignmentEngine>,
}

/// API request carrying only the acting user.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest {
    /// The actor ID performing this action.
    actor_id: String,
}

/// API request for applying to a posting.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ApplyApiRequest {
    /// The applicant.
    applicant_id: String,
    /// The cells applied for.
    selections: Vec<SelectionItem>,
}

/// API request for confirming an application.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ConfirmApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The selections to confirm.
    selections: Vec<SelectionItem>,
}

/// Query parameters for reading a posting.
#[derive(Debug, Deserialize)]
struct PostingQuery {
    /// When given, the response includes this actor's capabilities.
    actor_id: Option<String>,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Whether the same request may succeed if retried.
    retryable: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// Whether the client may retry.
    retryable: bool,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            retryable: self.retryable,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::CapacityExceeded { .. }
            | ApiError::InvalidTransition { .. }
            | ApiError::PostingClosed { .. }
            | ApiError::AlreadyApplied { .. } => StatusCode::CONFLICT,
            ApiError::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            ApiError::WriteConflict { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

/// Parses the acting user of a request; blank ids are rejected.
fn parse_actor(actor_id: &str) -> Result<ActorId, HttpError> {
    ActorId::parse(actor_id).map_err(|err| HttpError {
        status: StatusCode::BAD_REQUEST,
        retryable: false,
        message: err.to_string(),
    })
}

/// Runs engine work on the blocking pool, since stores may block on I/O.
async fn run_engine<T, F>(app_state: AppState, work: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&AssignmentEngine) -> Result<T, ApiError> + Send + 'static,
{
    let engine: Arc<AssignmentEngine> = app_state.engine;
    let result: Result<T, ApiError> = tokio::task::spawn_blocking(move || work(&engine))
        .await
        .map_err(|err| {
            error!(error = %err, "Engine task failed");
            HttpError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                retryable: false,
                message: String::from("Engine task failed"),
            }
        })?;
    result.map_err(HttpError::from)
}

/// Handler for GET `/postings/{posting_id}` endpoint.
async fn handle_get_posting(
    AxumState(app_state): AxumState<AppState>,
    Path(posting_id): Path<String>,
    Query(query): Query<PostingQuery>,
) -> Result<Json<PostingResponse>, HttpError> {
    let actor: Option<ActorId> = query.actor_id.as_deref().map(parse_actor).transpose()?;
    let response: PostingResponse = run_engine(app_state, move |engine| {
        engine.posting_response(&PostingId::new(&posting_id), actor.as_ref())
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/postings/{posting_id}/fulfillment` endpoint.
async fn handle_get_fulfillment(
    AxumState(app_state): AxumState<AppState>,
    Path(posting_id): Path<String>,
) -> Result<Json<FulfillmentResponse>, HttpError> {
    let response: FulfillmentResponse = run_engine(app_state, move |engine| {
        engine.fulfillment_by_date(&PostingId::new(&posting_id))
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/postings/{posting_id}/close` endpoint.
///
/// Force-closes the posting; it will not be reopened automatically.
async fn handle_close_posting(
    AxumState(app_state): AxumState<AppState>,
    Path(posting_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<PostingResponse>, HttpError> {
    info!(posting_id = %posting_id, actor_id = %req.actor_id, "Handling close request");
    let actor: ActorId = parse_actor(&req.actor_id)?;
    let response: PostingResponse = run_engine(app_state, move |engine| {
        engine.close_posting(&actor, &PostingId::new(&posting_id))
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/postings/{posting_id}/reopen` endpoint.
async fn handle_reopen_posting(
    AxumState(app_state): AxumState<AppState>,
    Path(posting_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<PostingResponse>, HttpError> {
    info!(posting_id = %posting_id, actor_id = %req.actor_id, "Handling reopen request");
    let actor: ActorId = parse_actor(&req.actor_id)?;
    let response: PostingResponse = run_engine(app_state, move |engine| {
        engine.reopen_posting(&actor, &PostingId::new(&posting_id))
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/postings/{posting_id}/applications` endpoint.
async fn handle_apply(
    AxumState(app_state): AxumState<AppState>,
    Path(posting_id): Path<String>,
    Json(req): Json<ApplyApiRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), HttpError> {
    info!(
        posting_id = %posting_id,
        applicant_id = %req.applicant_id,
        selections = req.selections.len(),
        "Handling apply request"
    );
    let applicant: ActorId = parse_actor(&req.applicant_id)?;
    let response: ApplicationResponse = run_engine(app_state, move |engine| {
        engine.apply(&applicant, &PostingId::new(&posting_id), &req.selections)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/applications/{application_id}` endpoint.
async fn handle_get_application(
    AxumState(app_state): AxumState<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    let response: ApplicationResponse = run_engine(app_state, move |engine| {
        engine.application_response(&ApplicationId::new(&application_id))
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/applications/{application_id}/confirm` endpoint.
async fn handle_confirm(
    AxumState(app_state): AxumState<AppState>,
    Path(application_id): Path<String>,
    Json(req): Json<ConfirmApiRequest>,
) -> Result<Json<AssignmentResponse>, HttpError> {
    info!(
        application_id = %application_id,
        actor_id = %req.actor_id,
        selections = req.selections.len(),
        "Handling confirm request"
    );
    let actor: ActorId = parse_actor(&req.actor_id)?;
    let response: AssignmentResponse = run_engine(app_state, move |engine| {
        engine.confirm(
            &actor,
            &ApplicationId::new(&application_id),
            &req.selections,
        )
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/applications/{application_id}/cancel` endpoint.
async fn handle_cancel(
    AxumState(app_state): AxumState<AppState>,
    Path(application_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<AssignmentResponse>, HttpError> {
    info!(application_id = %application_id, actor_id = %req.actor_id, "Handling cancel request");
    let actor: ActorId = parse_actor(&req.actor_id)?;
    let response: AssignmentResponse = run_engine(app_state, move |engine| {
        engine.cancel(&actor, &ApplicationId::new(&application_id))
    })
    .await?;
    Ok(Json(response))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/postings/{posting_id}", get(handle_get_posting))
        .route(
            "/postings/{posting_id}/fulfillment",
            get(handle_get_fulfillment),
        )
        .route("/postings/{posting_id}/close", post(handle_close_posting))
        .route("/postings/{posting_id}/reopen", post(handle_reopen_posting))
        .route("/postings/{posting_id}/applications", post(handle_apply))
        .route("/applications/{application_id}", get(handle_get_application))
        .route(
            "/applications/{application_id}/confirm",
            post(handle_confirm),
        )
        .route("/applications/{application_id}/cancel", post(handle_cancel))
        .with_state(app_state)
}

/// Builds the engine over `store` from command-line settings.
fn build_engine(
    args: &Args,
    store: Arc<dyn DocumentStore>,
) -> Result<AssignmentEngine, Box<dyn std::error::Error>> {
    let config: EngineConfig = EngineConfig {
        retry: RetryPolicy::new(args.max_attempts),
        calendar_offset: UtcOffset::from_hms(args.utc_offset_hours, 0, 0)?,
        date_label_cache_capacity: args.date_label_cache,
    };
    let admins: Vec<ActorId> = args
        .admins
        .iter()
        .map(|admin| ActorId::parse(admin))
        .collect::<Result<_, _>>()?;
    let policy: OwnerOrAdminPolicy = OwnerOrAdminPolicy::new(admins);

    Ok(AssignmentEngine::new(
        store.clone(),
        Box::new(policy),
        Box::new(StoreMaterializer::new(store)),
        config,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Staffing Server");

    // Initialize the document store (in-memory or file-based based on CLI argument)
    let store: Arc<dyn DocumentStore> = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Arc::new(SqliteStore::open(db_path)?)
    } else {
        info!("Using in-memory store");
        Arc::new(InMemoryStore::new())
    };

    let engine: AssignmentEngine = build_engine(&args, store)?;
    info!(
        admins = args.admins.len(),
        max_attempts = engine.config().retry.max_attempts,
        "Engine configured"
    );

    let app_state: AppState = AppState {
        engine: Arc::new(engine),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
