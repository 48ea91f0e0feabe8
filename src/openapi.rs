use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{Diagnostic, DiagnosticKind};
use crate::models::{
    CalendarEvent, CalendarItem, CalendarRequest, ClassSession, EventItem, Expansion,
    HighlightDates, MergedCalendar, Occurrence, ScheduleEntry,
};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::expand_class,
        crate::handlers::get_calendar,
        crate::handlers::get_highlights,
        crate::handlers::get_ical
    ),
    components(schemas(
        ScheduleEntry,
        ClassSession,
        CalendarEvent,
        CalendarRequest,
        Occurrence,
        EventItem,
        CalendarItem,
        Expansion,
        MergedCalendar,
        HighlightDates,
        Diagnostic,
        DiagnosticKind
    )),
    tags(
        (name = "calendar", description = "Class schedule expansion and calendar operations")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
