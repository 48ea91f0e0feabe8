use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use tracing::debug;
use url::Url;

use crate::error::{CalendarError, Diagnostic};
use crate::expander::{ScheduleExpander, in_window};
use crate::models::{CalendarEvent, CalendarItem, ClassSession, EventItem, MergedCalendar};

pub use crate::expander::DEFAULT_TIMEZONE;

/// Combines expanded class schedules and standalone events into one
/// chronologically ordered calendar.
#[derive(Debug, Clone)]
pub struct CalendarMerger {
    expander: ScheduleExpander,
}

impl Default for CalendarMerger {
    fn default() -> Self {
        Self::new(ScheduleExpander::default())
    }
}

impl CalendarMerger {
    /// Event timestamps are read in the expander's timezone so that class
    /// dates and events share one calendar.
    pub fn new(expander: ScheduleExpander) -> Self {
        Self { expander }
    }

    pub fn expander(&self) -> &ScheduleExpander {
        &self.expander
    }

    pub fn timezone(&self) -> Tz {
        self.expander.timezone()
    }

    /// Items are ordered by timestamp. At equal timestamps class occurrences
    /// come first, then standalone events, each group in input order.
    pub fn merge(&self, classes: &[ClassSession], events: &[CalendarEvent]) -> MergedCalendar {
        let mut merged = MergedCalendar::default();

        for class in classes {
            let expansion = self.expander.expand(class);
            merged
                .items
                .extend(expansion.occurrences.into_iter().map(CalendarItem::Schedule));
            merged.diagnostics.extend(expansion.diagnostics);
        }

        for event in events {
            match self.convert_event(event, &mut merged.diagnostics) {
                Ok(item) => merged.items.push(CalendarItem::Event(item)),
                Err(err) => merged.diagnostics.push(Diagnostic::report(&event.id, err)),
            }
        }

        merged.items.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then(a.tie_rank().cmp(&b.tie_rank()))
        });
        debug!(
            classes = classes.len(),
            events = events.len(),
            items = merged.items.len(),
            skipped = merged.diagnostics.len(),
            "merged calendar"
        );
        merged
    }

    fn convert_event(
        &self,
        event: &CalendarEvent,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<EventItem, CalendarError> {
        let timestamp = parse_event_timestamp(&event.date, self.timezone())?;

        let link = match event.link.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url.to_string()),
                Err(_) => {
                    diagnostics.push(Diagnostic::report(
                        &event.id,
                        CalendarError::MalformedLink(raw.to_string()),
                    ));
                    None
                }
            },
        };

        Ok(EventItem {
            event_id: event.id.clone(),
            timestamp,
            title: event.title.clone(),
            description: event.description.clone(),
            event_type: event.event_type.clone(),
            is_online: event.is_online,
            link,
        })
    }
}

impl MergedCalendar {
    /// Keeps items dated within `[from, to]`; an open bound is unbounded.
    pub fn within(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.items.retain(|item| in_window(item.date(), from, to));
        self
    }

    pub fn highlight_dates(&self) -> Vec<NaiveDate> {
        self.items
            .iter()
            .map(CalendarItem::date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Distinct dates carrying at least one class occurrence or event.
pub fn highlight_dates(
    merger: &CalendarMerger,
    classes: &[ClassSession],
    events: &[CalendarEvent],
) -> Vec<NaiveDate> {
    merger.merge(classes, events).highlight_dates()
}

/// Offset-carrying timestamps are shifted into `timezone` wall-clock time so
/// they line up with class occurrences; naive ones are taken as-is.
pub(crate) fn parse_event_timestamp(value: &str, timezone: Tz) -> Result<NaiveDateTime, CalendarError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&timezone).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| CalendarError::MalformedEventDate(value.to_string()))
}
