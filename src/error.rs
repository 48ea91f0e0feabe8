use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
        }
    }
}

/// Per-item failures of schedule expansion and merging.
///
/// None of these abort a merge: the offending schedule entry, class or event
/// is left out and the error is reported as a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalendarError {
    #[error("Unknown weekday label: {0:?}")]
    UnknownWeekday(String),
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("Malformed class date: {0:?}")]
    MalformedClassDate(String),
    #[error("Malformed schedule time: {0:?}")]
    MalformedTime(String),
    #[error("Malformed event date: {0:?}")]
    MalformedEventDate(String),
    #[error("Malformed event link: {0:?}")]
    MalformedLink(String),
    #[error("Date range spans {days} days, limit is {max} (set GAWWE_MAX_RANGE_DAYS to raise it)")]
    RangeTooLong { days: i64, max: u32 },
    #[error("Duplicate occurrence on {date} at {start}")]
    DuplicateOccurrence { date: NaiveDate, start: NaiveTime },
}

impl CalendarError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CalendarError::UnknownWeekday(_) => DiagnosticKind::UnknownWeekday,
            CalendarError::InvalidDateRange { .. } => DiagnosticKind::InvalidDateRange,
            CalendarError::MalformedClassDate(_) => DiagnosticKind::MalformedClassDate,
            CalendarError::MalformedTime(_) => DiagnosticKind::MalformedTime,
            CalendarError::MalformedEventDate(_) => DiagnosticKind::MalformedEventDate,
            CalendarError::MalformedLink(_) => DiagnosticKind::MalformedLink,
            CalendarError::RangeTooLong { .. } => DiagnosticKind::RangeTooLong,
            CalendarError::DuplicateOccurrence { .. } => DiagnosticKind::DuplicateOccurrence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnknownWeekday,
    InvalidDateRange,
    MalformedClassDate,
    MalformedTime,
    MalformedEventDate,
    MalformedLink,
    RangeTooLong,
    DuplicateOccurrence,
}

/// A skipped or degraded input item, reported alongside the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Id of the class or event the problem was found in.
    pub item_id: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Logs the error and wraps it for the response.
    pub fn report(item_id: &str, err: CalendarError) -> Self {
        warn!(item_id, error = %err, "skipping calendar input");
        Self {
            item_id: item_id.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
