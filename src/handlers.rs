use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::NaiveDate;

use crate::{
    AppState,
    auth::verify_token,
    error::ApiError,
    models::{CalendarRequest, ClassSession, Expansion, HighlightDates, MergedCalendar},
    validation::validate_window,
};

#[derive(Debug, serde::Deserialize)]
pub struct CalendarQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub token: Option<String>,
}

fn authorize(
    state: &AppState,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    query: &CalendarQuery,
) -> Result<(), ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;
    validate_window(query.from, query.to, state.settings.max_range_days)
}

#[utoipa::path(get, path = "/", tag = "calendar")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Gawwe Calendar API",
        "endpoints": {
            "/classes/expand": "Expand one class schedule into occurrences",
            "/calendar": "Merged calendar of class occurrences and events as JSON",
            "/calendar/highlights": "Dates that carry at least one calendar item",
            "/calendar.ical": "Merged calendar as iCal file"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "calendar")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "calendar")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    post,
    path = "/classes/expand",
    params(
        ("from" = Option<String>, Query, description = "First date to include (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last date to include (YYYY-MM-DD)"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = ClassSession,
    responses(
        (status = 200, description = "Occurrences of the class", body = Expansion),
        (status = 400, description = "Invalid date window"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "calendar"
)]
pub async fn expand_class(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<CalendarQuery>,
    Json(class): Json<ClassSession>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, &query)?;

    let expansion = state
        .merger
        .expander()
        .expand(&class)
        .within(query.from, query.to);
    Ok(Json(expansion))
}

#[utoipa::path(
    post,
    path = "/calendar",
    params(
        ("from" = Option<String>, Query, description = "First date to include (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last date to include (YYYY-MM-DD)"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = CalendarRequest,
    responses(
        (status = 200, description = "Merged calendar", body = MergedCalendar),
        (status = 400, description = "Invalid date window"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "calendar"
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<CalendarQuery>,
    Json(request): Json<CalendarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, &query)?;

    let merged = state
        .merger
        .merge(&request.classes, &request.events)
        .within(query.from, query.to);
    Ok(Json(merged))
}

#[utoipa::path(
    post,
    path = "/calendar/highlights",
    params(
        ("from" = Option<String>, Query, description = "First date to include (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last date to include (YYYY-MM-DD)"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = CalendarRequest,
    responses(
        (status = 200, description = "Highlighted dates", body = HighlightDates),
        (status = 400, description = "Invalid date window"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "calendar"
)]
pub async fn get_highlights(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<CalendarQuery>,
    Json(request): Json<CalendarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, &query)?;

    let merged = state
        .merger
        .merge(&request.classes, &request.events)
        .within(query.from, query.to);
    Ok(Json(HighlightDates {
        dates: merged.highlight_dates(),
        diagnostics: merged.diagnostics,
    }))
}

#[utoipa::path(
    post,
    path = "/calendar.ical",
    params(
        ("from" = Option<String>, Query, description = "First date to include (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last date to include (YYYY-MM-DD)"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = CalendarRequest,
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 400, description = "Invalid date window"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No calendar items found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "calendar"
)]
pub async fn get_ical(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<CalendarQuery>,
    Json(request): Json<CalendarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, &query)?;

    let merged = state
        .merger
        .merge(&request.classes, &request.events)
        .within(query.from, query.to);

    if merged.items.is_empty() {
        return Err(ApiError::NotFound("No calendar items found".into()));
    }

    let body = state.exporter.generate(&merged.items);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            ("content-disposition", "attachment; filename=gawwe_calendar.ics"),
        ],
        body,
    ))
}
