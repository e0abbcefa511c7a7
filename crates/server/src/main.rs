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

mod live;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use clubreg_api::{
    ApiError, AuditTimelineResponse, AuthenticatedActor, CapacityInfo, CreateResourceRequest,
    ListRegistrationsRequest, ListRegistrationsResponse, ListResourcesResponse,
    RegistrationHistoryResponse, RegistrationInfo, RejectRegistrationRequest, ResourceInfo,
    ResourceResponse, Role, SetCapacityRequest, SetResourceOpenRequest, SubmitRegistrationRequest,
    TransitionResponse, approve_registration, audit_timeline, authenticate_stub,
    cancel_registration, create_resource, dashboard, get_capacity, get_registration, get_resource,
    list_registrations, list_resources, parse_role, registration_history, reject_registration,
    set_capacity, set_resource_open, submit_registration,
};
use clubreg_audit::Cause;
use clubreg_domain::RegistrationDetails;
use clubreg_persistence::{DashboardSummary, Persistence};
use live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Club Registration Server - HTTP server for the club registration system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How long a write waits on a locked database, in milliseconds
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,
}

/// Application state shared across handlers.
///
/// Requests are serialized on the persistence mutex; the database
/// transaction inside each operation is what enforces the invariants.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    live: Arc<LiveEventBroadcaster>,
}

impl AppState {
    fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            live: Arc::new(LiveEventBroadcaster::new()),
        }
    }

    fn announce_transition(&self, response: &TransitionResponse) {
        self.live
            .broadcast(&LiveEvent::registration_changed(&response.registration));
        if let Some(promoted) = &response.promoted {
            self.live
                .broadcast(&LiveEvent::registration_changed(promoted));
        }
    }
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.live)
    }
}

/// Who is acting, and why. Carried by every write request.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct Attribution {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor (`admin` or `registrant`).
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
}

impl Attribution {
    fn authenticate(self) -> Result<(AuthenticatedActor, Cause), HttpError> {
        let role: Role = parse_role(&self.actor_role).map_err(ApiError::from)?;
        let actor: AuthenticatedActor =
            authenticate_stub(self.actor_id, role).map_err(ApiError::from)?;
        Ok((actor, Cause::new(self.cause_id, self.cause_description)))
    }
}

/// API request for creating a resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateResourceApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
    /// `competition`, `event` or `formation`.
    kind: String,
    title: String,
    /// Omitted for unlimited capacity.
    #[serde(default)]
    max_capacity: Option<i64>,
}

/// API request for opening or closing a resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SetResourceOpenApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
    is_open: bool,
}

/// API request for changing a resource's capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SetCapacityApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
    /// `null` removes the limit.
    #[serde(default)]
    max_capacity: Option<i64>,
}

/// API request for submitting a registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SubmitRegistrationApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
    kind: String,
    resource_id: i64,
    registrant_id: i64,
    #[serde(default)]
    details: RegistrationDetails,
}

/// API request for approving or cancelling a registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct DecisionApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
}

/// API request for rejecting a registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RejectRegistrationApiRequest {
    #[serde(flatten)]
    attribution: Attribution,
    #[serde(default)]
    reason: Option<String>,
}

/// Query parameters for listing resources.
#[derive(Debug, Clone, Deserialize)]
struct ListResourcesQuery {
    kind: Option<String>,
}

/// Query parameters for listing a resource's registrations.
#[derive(Debug, Clone, Deserialize)]
struct ListRegistrationsQuery {
    status: Option<String>,
    page_size: Option<i64>,
}

/// Query parameters for the audit timeline.
#[derive(Debug, Clone, Deserialize)]
struct AuditTimelineQuery {
    kind: String,
    id: i64,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    error: bool,
    message: String,
}

/// HTTP error wrapper for API errors.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } | ApiError::RegistrationNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::DuplicateRegistration { .. }
            | ApiError::InvalidTransition { .. }
            | ApiError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

async fn handle_create_resource(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateResourceApiRequest>,
) -> Result<Json<ResourceResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        kind = %req.kind,
        "Handling create_resource request"
    );

    let (actor, cause) = req.attribution.authenticate()?;
    let request: CreateResourceRequest = CreateResourceRequest {
        kind: req.kind,
        title: req.title,
        max_capacity: req.max_capacity,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ResourceResponse = create_resource(&mut persistence, &request, &actor, cause)?;
    drop(persistence);

    app_state
        .live
        .broadcast(&LiveEvent::resource_created(&response.resource));
    Ok(Json(response))
}

async fn handle_list_resources(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<Json<ListResourcesResponse>, HttpError> {
    debug!(kind = ?query.kind, "Handling list_resources request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListResourcesResponse = list_resources(&mut persistence, query.kind.as_deref())?;
    Ok(Json(response))
}

async fn handle_get_resource(
    AxumState(app_state): AxumState<AppState>,
    Path((kind, resource_id)): Path<(String, i64)>,
) -> Result<Json<ResourceInfo>, HttpError> {
    debug!(%kind, resource_id, "Handling get_resource request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ResourceInfo = get_resource(&mut persistence, &kind, resource_id)?;
    Ok(Json(response))
}

async fn handle_set_resource_open(
    AxumState(app_state): AxumState<AppState>,
    Path((kind, resource_id)): Path<(String, i64)>,
    Json(req): Json<SetResourceOpenApiRequest>,
) -> Result<Json<ResourceResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        %kind,
        resource_id,
        is_open = req.is_open,
        "Handling set_resource_open request"
    );

    let (actor, cause) = req.attribution.authenticate()?;
    let request: SetResourceOpenRequest = SetResourceOpenRequest {
        is_open: req.is_open,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ResourceResponse =
        set_resource_open(&mut persistence, &kind, resource_id, request, &actor, cause)?;
    drop(persistence);

    app_state
        .live
        .broadcast(&LiveEvent::resource_updated(&response.resource));
    Ok(Json(response))
}

async fn handle_set_capacity(
    AxumState(app_state): AxumState<AppState>,
    Path((kind, resource_id)): Path<(String, i64)>,
    Json(req): Json<SetCapacityApiRequest>,
) -> Result<Json<ResourceResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        %kind,
        resource_id,
        max_capacity = ?req.max_capacity,
        "Handling set_capacity request"
    );

    let (actor, cause) = req.attribution.authenticate()?;
    let request: SetCapacityRequest = SetCapacityRequest {
        max_capacity: req.max_capacity,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ResourceResponse =
        set_capacity(&mut persistence, &kind, resource_id, request, &actor, cause)?;
    drop(persistence);

    app_state
        .live
        .broadcast(&LiveEvent::resource_updated(&response.resource));
    Ok(Json(response))
}

async fn handle_get_capacity(
    AxumState(app_state): AxumState<AppState>,
    Path((kind, resource_id)): Path<(String, i64)>,
) -> Result<Json<CapacityInfo>, HttpError> {
    debug!(%kind, resource_id, "Handling get_capacity request");

    let mut persistence = app_state.persistence.lock().await;
    let response: CapacityInfo = get_capacity(&mut persistence, &kind, resource_id)?;
    Ok(Json(response))
}

async fn handle_list_registrations(
    AxumState(app_state): AxumState<AppState>,
    Path((kind, resource_id)): Path<(String, i64)>,
    Query(query): Query<ListRegistrationsQuery>,
) -> Result<Json<ListRegistrationsResponse>, HttpError> {
    debug!(%kind, resource_id, status = ?query.status, "Handling list_registrations request");

    let request: ListRegistrationsRequest = ListRegistrationsRequest {
        status: query.status,
        page_size: query.page_size,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ListRegistrationsResponse =
        list_registrations(&mut persistence, &kind, resource_id, &request)?;
    Ok(Json(response))
}

// ============================================================================
// Registrations
// ============================================================================

async fn handle_submit_registration(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SubmitRegistrationApiRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        kind = %req.kind,
        resource_id = req.resource_id,
        registrant_id = req.registrant_id,
        "Handling submit_registration request"
    );

    let (actor, cause) = req.attribution.authenticate()?;
    let request: SubmitRegistrationRequest = SubmitRegistrationRequest {
        kind: req.kind,
        resource_id: req.resource_id,
        registrant_id: req.registrant_id,
        details: req.details,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: TransitionResponse =
        submit_registration(&mut persistence, request, &actor, cause)?;
    drop(persistence);

    app_state.announce_transition(&response);
    Ok(Json(response))
}

async fn handle_get_registration(
    AxumState(app_state): AxumState<AppState>,
    Path(registration_id): Path<i64>,
) -> Result<Json<RegistrationInfo>, HttpError> {
    debug!(registration_id, "Handling get_registration request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RegistrationInfo = get_registration(&mut persistence, registration_id)?;
    Ok(Json(response))
}

async fn handle_approve_registration(
    AxumState(app_state): AxumState<AppState>,
    Path(registration_id): Path<i64>,
    Json(req): Json<DecisionApiRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        registration_id,
        "Handling approve_registration request"
    );

    let (actor, cause) = req.attribution.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: TransitionResponse =
        approve_registration(&mut persistence, registration_id, &actor, cause)?;
    drop(persistence);

    app_state.announce_transition(&response);
    Ok(Json(response))
}

async fn handle_reject_registration(
    AxumState(app_state): AxumState<AppState>,
    Path(registration_id): Path<i64>,
    Json(req): Json<RejectRegistrationApiRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        registration_id,
        "Handling reject_registration request"
    );

    let (actor, cause) = req.attribution.authenticate()?;
    let request: RejectRegistrationRequest = RejectRegistrationRequest { reason: req.reason };

    let mut persistence = app_state.persistence.lock().await;
    let response: TransitionResponse =
        reject_registration(&mut persistence, registration_id, request, &actor, cause)?;
    drop(persistence);

    app_state.announce_transition(&response);
    Ok(Json(response))
}

async fn handle_cancel_registration(
    AxumState(app_state): AxumState<AppState>,
    Path(registration_id): Path<i64>,
    Json(req): Json<DecisionApiRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        registration_id,
        "Handling cancel_registration request"
    );

    let (actor, cause) = req.attribution.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: TransitionResponse =
        cancel_registration(&mut persistence, registration_id, &actor, cause)?;
    drop(persistence);

    app_state.announce_transition(&response);
    Ok(Json(response))
}

async fn handle_registration_history(
    AxumState(app_state): AxumState<AppState>,
    Path(registration_id): Path<i64>,
) -> Result<Json<RegistrationHistoryResponse>, HttpError> {
    debug!(registration_id, "Handling registration_history request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RegistrationHistoryResponse =
        registration_history(&mut persistence, registration_id)?;
    Ok(Json(response))
}

// ============================================================================
// Audit & Dashboard
// ============================================================================

async fn handle_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AuditTimelineQuery>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    debug!(kind = %query.kind, resource_id = query.id, "Handling audit_timeline request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuditTimelineResponse = audit_timeline(&mut persistence, &query.kind, query.id)?;
    Ok(Json(response))
}

async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<DashboardSummary>, HttpError> {
    debug!("Handling dashboard request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DashboardSummary = dashboard(&mut persistence)?;
    Ok(Json(response))
}

/// Builds the application router.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/resources",
            post(handle_create_resource).get(handle_list_resources),
        )
        .route("/resources/{kind}/{id}", get(handle_get_resource))
        .route("/resources/{kind}/{id}/open", post(handle_set_resource_open))
        .route(
            "/resources/{kind}/{id}/capacity",
            get(handle_get_capacity).post(handle_set_capacity),
        )
        .route(
            "/resources/{kind}/{id}/registrations",
            get(handle_list_registrations),
        )
        .route("/registrations", post(handle_submit_registration))
        .route("/registrations/{id}", get(handle_get_registration))
        .route(
            "/registrations/{id}/approve",
            post(handle_approve_registration),
        )
        .route("/registrations/{id}/reject", post(handle_reject_registration))
        .route("/registrations/{id}/cancel", post(handle_cancel_registration))
        .route(
            "/registrations/{id}/history",
            get(handle_registration_history),
        )
        .route("/audit/timeline", get(handle_audit_timeline))
        .route("/dashboard", get(handle_dashboard))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Club Registration Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.set_busy_timeout(Duration::from_millis(args.busy_timeout_ms))?;
    persistence.verify_foreign_key_enforcement()?;

    let app: Router = build_router(AppState::new(persistence));

    let ip: IpAddr = args.bind.parse()?;
    let addr: SocketAddr = SocketAddr::from((ip, args.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState::new(persistence)
    }

    fn admin() -> Attribution {
        Attribution {
            actor_id: String::from("admin1"),
            actor_role: String::from("admin"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Test request"),
        }
    }

    fn registrant(registrant_id: i64) -> Attribution {
        Attribution {
            actor_id: registrant_id.to_string(),
            actor_role: String::from("registrant"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Test request"),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (HttpStatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status: HttpStatusCode = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post_json<T: Serialize>(app: &Router, uri: &str, body: &T) -> (HttpStatusCode, Value) {
        send(
            app,
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
    }

    async fn get_json(app: &Router, uri: &str) -> (HttpStatusCode, Value) {
        send(
            app,
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn create_competition(app: &Router, max_capacity: Option<i64>) -> i64 {
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution: admin(),
            kind: String::from("competition"),
            title: String::from("Spring Cup"),
            max_capacity,
        };
        let (status, body) = post_json(app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::OK);
        let response: ResourceResponse = serde_json::from_value(body).unwrap();
        response.resource.resource_id
    }

    async fn submit(app: &Router, resource_id: i64, registrant_id: i64) -> (HttpStatusCode, Value) {
        let req: SubmitRegistrationApiRequest = SubmitRegistrationApiRequest {
            attribution: registrant(registrant_id),
            kind: String::from("competition"),
            resource_id,
            registrant_id,
            details: RegistrationDetails {
                participant_name: Some(format!("Member {registrant_id}")),
                ..RegistrationDetails::default()
            },
        };
        post_json(app, "/registrations", &req).await
    }

    async fn submit_ok(app: &Router, resource_id: i64, registrant_id: i64) -> TransitionResponse {
        let (status, body) = submit(app, resource_id, registrant_id).await;
        assert_eq!(status, HttpStatusCode::OK);
        serde_json::from_value(body).unwrap()
    }

    async fn decide(
        app: &Router,
        registration_id: i64,
        action: &str,
        attribution: Attribution,
    ) -> (HttpStatusCode, Value) {
        let req: DecisionApiRequest = DecisionApiRequest { attribution };
        post_json(
            app,
            &format!("/registrations/{registration_id}/{action}"),
            &req,
        )
        .await
    }

    #[tokio::test]
    async fn test_create_resource_as_admin_succeeds() {
        let app: Router = build_router(create_test_app_state());

        let resource_id: i64 = create_competition(&app, Some(10)).await;

        let (status, body) = get_json(&app, &format!("/resources/competition/{resource_id}")).await;
        assert_eq!(status, HttpStatusCode::OK);
        let info: ResourceInfo = serde_json::from_value(body).unwrap();
        assert_eq!(info.title, "Spring Cup");
        assert_eq!(info.max_capacity, Some(10));
        assert!(info.is_open);
    }

    #[tokio::test]
    async fn test_create_resource_as_registrant_is_forbidden() {
        let app: Router = build_router(create_test_app_state());
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution: registrant(7),
            kind: String::from("event"),
            title: String::from("Club Dinner"),
            max_capacity: None,
        };

        let (status, body) = post_json(&app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_blank_actor_is_unauthenticated() {
        let app: Router = build_router(create_test_app_state());
        let mut attribution: Attribution = admin();
        attribution.actor_id = String::from("   ");
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution,
            kind: String::from("event"),
            title: String::from("Club Dinner"),
            max_capacity: None,
        };

        let (status, _) = post_json(&app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution: admin(),
            kind: String::from("tournament"),
            title: String::from("Autumn Open"),
            max_capacity: None,
        };

        let (status, _) = post_json(&app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);

        let (status, _) = get_json(&app, "/resources?kind=tournament").await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_capacity_beyond_storage_range_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution: admin(),
            kind: String::from("event"),
            title: String::from("Big"),
            max_capacity: Some(3_000_000_000),
        };
        let (status, _) = post_json(&app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);

        let resource_id: i64 = create_competition(&app, Some(5)).await;
        let uri: String = format!("/resources/competition/{resource_id}/capacity");
        let grow: SetCapacityApiRequest = SetCapacityApiRequest {
            attribution: admin(),
            max_capacity: Some(3_000_000_000),
        };
        let (status, _) = post_json(&app, &uri, &grow).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);

        let (_, body) = get_json(&app, &uri).await;
        let capacity: CapacityInfo = serde_json::from_value(body).unwrap();
        assert_eq!(capacity.max_capacity, Some(5));
    }

    #[tokio::test]
    async fn test_list_resources_filters_by_kind() {
        let app: Router = build_router(create_test_app_state());
        create_competition(&app, None).await;
        let req: CreateResourceApiRequest = CreateResourceApiRequest {
            attribution: admin(),
            kind: String::from("formation"),
            title: String::from("First Aid"),
            max_capacity: Some(12),
        };
        let (status, _) = post_json(&app, "/resources", &req).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = get_json(&app, "/resources?kind=formation").await;
        assert_eq!(status, HttpStatusCode::OK);
        let list: ListResourcesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.resources.len(), 1);
        assert_eq!(list.resources[0].title, "First Aid");

        let (_, body) = get_json(&app, "/resources").await;
        let list: ListResourcesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.resources.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found() {
        let app: Router = build_router(create_test_app_state());

        let (status, _) = get_json(&app, "/resources/event/999").await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);

        let (status, _) = submit(&app, 999, 1).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_then_duplicate_conflicts() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, Some(5)).await;

        let first: TransitionResponse = submit_ok(&app, resource_id, 1).await;
        assert_eq!(first.registration.status, "pending");
        assert_eq!(first.registration.status_label, "pending");

        let (status, _) = submit(&app, resource_id, 1).await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_registrant_cannot_submit_for_someone_else() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, None).await;
        let req: SubmitRegistrationApiRequest = SubmitRegistrationApiRequest {
            attribution: registrant(1),
            kind: String::from("competition"),
            resource_id,
            registrant_id: 2,
            details: RegistrationDetails::default(),
        };

        let (status, _) = post_json(&app, "/registrations", &req).await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_approve_beyond_capacity_conflicts() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, Some(1)).await;
        let a: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;
        let b: i64 = submit_ok(&app, resource_id, 2).await.registration.registration_id;

        let (status, body) = decide(&app, a, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::OK);
        let approved: TransitionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(approved.registration.status, "approved");
        assert_eq!(approved.registration.status_label, "accepted");

        let (status, _) = decide(&app, b, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::CONFLICT);

        let (_, body) = get_json(&app, &format!("/registrations/{b}")).await;
        let unchanged: RegistrationInfo = serde_json::from_value(body).unwrap();
        assert_eq!(unchanged.status, "pending");

        let (_, body) = get_json(&app, &format!("/resources/competition/{resource_id}/capacity")).await;
        let capacity: CapacityInfo = serde_json::from_value(body).unwrap();
        assert_eq!(capacity.accepted_count, 1);
        assert_eq!(capacity.remaining, Some(0));
        assert!(!capacity.has_room);
    }

    #[tokio::test]
    async fn test_approve_as_registrant_is_forbidden() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, None).await;
        let id: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;

        let (status, _) = decide(&app, id, "approve", registrant(1)).await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_cancel_promotes_waitlisted_registration() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, Some(1)).await;
        let a: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;
        let (status, _) = decide(&app, a, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::OK);

        let waitlisted: TransitionResponse = submit_ok(&app, resource_id, 2).await;
        assert_eq!(waitlisted.registration.status, "waitlisted");
        let b: i64 = waitlisted.registration.registration_id;

        let (status, _) = decide(&app, a, "cancel", registrant(2)).await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);

        let (status, body) = decide(&app, a, "cancel", registrant(1)).await;
        assert_eq!(status, HttpStatusCode::OK);
        let cancelled: TransitionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(cancelled.registration.status, "cancelled");
        assert_eq!(cancelled.registration.status_label, "withdrawn");
        let promoted: RegistrationInfo = cancelled.promoted.unwrap();
        assert_eq!(promoted.registration_id, b);
        assert_eq!(promoted.status, "pending");

        let (status, _) = decide(&app, a, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_reject_records_reason_in_history() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, None).await;
        let id: i64 = submit_ok(&app, resource_id, 3).await.registration.registration_id;

        let req: RejectRegistrationApiRequest = RejectRegistrationApiRequest {
            attribution: admin(),
            reason: Some(String::from("Entry form incomplete")),
        };
        let (status, _) = post_json(&app, &format!("/registrations/{id}/reject"), &req).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = get_json(&app, &format!("/registrations/{id}/history")).await;
        assert_eq!(status, HttpStatusCode::OK);
        let history: RegistrationHistoryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.entries[0].previous_status, None);
        assert_eq!(history.entries[1].new_status, "rejected");
        assert!(
            history.entries[1]
                .notes
                .as_deref()
                .is_some_and(|n| n.contains("Entry form incomplete"))
        );
    }

    #[tokio::test]
    async fn test_missing_registration_is_not_found() {
        let app: Router = build_router(create_test_app_state());

        let (status, _) = get_json(&app, "/registrations/42").await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);

        let (status, _) = decide(&app, 42, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_closed_resource_rejects_submission() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, None).await;
        let req: SetResourceOpenApiRequest = SetResourceOpenApiRequest {
            attribution: admin(),
            is_open: false,
        };

        let (status, body) = post_json(
            &app,
            &format!("/resources/competition/{resource_id}/open"),
            &req,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let response: ResourceResponse = serde_json::from_value(body).unwrap();
        assert!(!response.resource.is_open);

        let (status, _) = submit(&app, resource_id, 1).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_capacity_below_approved_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, Some(3)).await;
        for registrant_id in 1..=2 {
            let id: i64 = submit_ok(&app, resource_id, registrant_id)
                .await
                .registration
                .registration_id;
            let (status, _) = decide(&app, id, "approve", admin()).await;
            assert_eq!(status, HttpStatusCode::OK);
        }

        let uri: String = format!("/resources/competition/{resource_id}/capacity");
        let shrink: SetCapacityApiRequest = SetCapacityApiRequest {
            attribution: admin(),
            max_capacity: Some(1),
        };
        let (status, _) = post_json(&app, &uri, &shrink).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);

        let unlimited: SetCapacityApiRequest = SetCapacityApiRequest {
            attribution: admin(),
            max_capacity: None,
        };
        let (status, _) = post_json(&app, &uri, &unlimited).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (_, body) = get_json(&app, &uri).await;
        let capacity: CapacityInfo = serde_json::from_value(body).unwrap();
        assert_eq!(capacity.accepted_count, 2);
        assert_eq!(capacity.max_capacity, None);
        assert!(capacity.has_room);
    }

    #[tokio::test]
    async fn test_list_registrations_in_submission_order() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, None).await;
        let first: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;
        submit_ok(&app, resource_id, 2).await;
        submit_ok(&app, resource_id, 3).await;
        let (status, _) = decide(&app, first, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::OK);

        let uri: String = format!("/resources/competition/{resource_id}/registrations");
        let (status, body) = get_json(&app, &format!("{uri}?page_size=1")).await;
        assert_eq!(status, HttpStatusCode::OK);
        let list: ListRegistrationsResponse = serde_json::from_value(body).unwrap();
        let registrants: Vec<i64> = list.registrations.iter().map(|r| r.registrant_id).collect();
        assert_eq!(registrants, vec![1, 2, 3]);

        let (_, body) = get_json(&app, &format!("{uri}?status=pending")).await;
        let list: ListRegistrationsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.registrations.len(), 2);

        let (status, _) = get_json(&app, &format!("{uri}?status=accepted")).await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_audit_timeline_and_dashboard() {
        let app: Router = build_router(create_test_app_state());
        let resource_id: i64 = create_competition(&app, Some(2)).await;
        let id: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;
        let (status, _) = decide(&app, id, "approve", admin()).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = get_json(
            &app,
            &format!("/audit/timeline?kind=competition&id={resource_id}"),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let timeline: AuditTimelineResponse = serde_json::from_value(body).unwrap();
        assert_eq!(timeline.events.len(), 3);
        assert_eq!(timeline.events[2].registration_id, Some(id));

        let (status, body) = get_json(&app, "/dashboard").await;
        assert_eq!(status, HttpStatusCode::OK);
        let competition: &Value = body["kinds"]
            .as_array()
            .unwrap()
            .iter()
            .find(|k| k["kind"] == "competition")
            .unwrap();
        assert_eq!(competition["total_resources"], 1);
        assert_eq!(competition["registrations"]["approved"], 1);
    }

    #[tokio::test]
    async fn test_transitions_are_broadcast() {
        let app_state: AppState = create_test_app_state();
        let mut rx = app_state.live.subscribe();
        let app: Router = build_router(app_state.clone());

        let resource_id: i64 = create_competition(&app, None).await;
        let id: i64 = submit_ok(&app, resource_id, 1).await.registration.registration_id;

        assert_eq!(
            rx.try_recv().unwrap(),
            LiveEvent::ResourceCreated {
                kind: String::from("competition"),
                resource_id,
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            LiveEvent::RegistrationChanged {
                registration_id: id,
                kind: String::from("competition"),
                resource_id,
                status: String::from("pending"),
            }
        );

        let (status, _) = submit(&app, resource_id, 1).await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert!(rx.try_recv().is_err());
    }
}
