use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Diagnostic;

/// One weekly recurrence rule of a class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[schema(example = "SENIN")]
    pub day: String,
    #[schema(example = "19:00:00")]
    pub start_time: String,
    #[schema(example = "21:00:00")]
    pub end_time: String,
}

/// A class offering as supplied by the class-management layer.
///
/// Dates are kept as received so that a malformed record only removes that
/// class from the calendar instead of failing the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "2024-01-01")]
    pub start_date: String,
    #[schema(example = "2024-01-21")]
    pub end_date: String,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
}

/// A one-off calendar entry not derived from any class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[schema(example = "2024-01-10T09:00:00+07:00")]
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub class_id: String,
    #[schema(value_type = String, format = "date-time", example = "2024-01-01T19:00:00")]
    pub timestamp: NaiveDateTime,
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "19:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "21:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub event_id: String,
    #[schema(value_type = String, format = "date-time", example = "2024-01-10T09:00:00")]
    pub timestamp: NaiveDateTime,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub is_online: bool,
    pub link: Option<String>,
}

/// A displayable calendar entry, tagged by where it came from.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CalendarItem {
    Schedule(Occurrence),
    Event(EventItem),
}

impl CalendarItem {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            CalendarItem::Schedule(occ) => occ.timestamp,
            CalendarItem::Event(ev) => ev.timestamp,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp().date()
    }

    pub fn title(&self) -> &str {
        match self {
            CalendarItem::Schedule(occ) => &occ.title,
            CalendarItem::Event(ev) => &ev.title,
        }
    }

    // Class occurrences sort ahead of standalone events sharing a timestamp.
    pub(crate) fn tie_rank(&self) -> u8 {
        match self {
            CalendarItem::Schedule(_) => 0,
            CalendarItem::Event(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, ToSchema)]
pub struct Expansion {
    pub occurrences: Vec<Occurrence>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, ToSchema)]
pub struct MergedCalendar {
    pub items: Vec<CalendarItem>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CalendarRequest {
    #[serde(default)]
    pub classes: Vec<ClassSession>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HighlightDates {
    #[schema(value_type = Vec<String>)]
    pub dates: Vec<NaiveDate>,
    pub diagnostics: Vec<Diagnostic>,
}
