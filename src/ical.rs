use chrono::{Datelike, Duration, NaiveDateTime};
use icalendar::{Calendar, Component, Event, EventLike};

use crate::day_name::{Locale, day_label};
use crate::models::CalendarItem;

#[derive(Clone)]
pub struct ICalExporter {
    calendar_name: String,
}

impl Default for ICalExporter {
    fn default() -> Self {
        Self::new("Gawwe")
    }
}

impl ICalExporter {
    pub fn new(calendar_name: impl Into<String>) -> Self {
        Self {
            calendar_name: calendar_name.into(),
        }
    }

    pub fn generate(&self, items: &[CalendarItem]) -> Vec<u8> {
        if items.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&self.calendar_name);

        for (position, item) in items.iter().enumerate() {
            let start = item.timestamp();
            let mut event = Event::new();
            event.summary(item.title());
            event.starts(start);
            event.ends(item_end(item));

            match item {
                CalendarItem::Schedule(occ) => {
                    let day = day_label(start.weekday(), Locale::Id);
                    let mut description = format!(
                        "Jadwal kelas: {} {}-{}",
                        day,
                        occ.start_time.format("%H:%M"),
                        occ.end_time.format("%H:%M")
                    );
                    if !occ.description.is_empty() {
                        description.push('\n');
                        description.push_str(&occ.description);
                    }
                    event.description(&description);
                    event.add_property("CATEGORIES", "schedule");
                    event.uid(&uid(&occ.class_id, start, "schedule", position));
                }
                CalendarItem::Event(ev) => {
                    if !ev.description.is_empty() {
                        event.description(&ev.description);
                    }
                    if let Some(link) = &ev.link {
                        event.url(link);
                    }
                    if ev.is_online {
                        event.location("Online");
                    }
                    let category = if ev.event_type.is_empty() {
                        "event"
                    } else {
                        ev.event_type.as_str()
                    };
                    event.add_property("CATEGORIES", category);
                    event.uid(&uid(&ev.event_id, start, "event", position));
                }
            }
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}

fn item_end(item: &CalendarItem) -> NaiveDateTime {
    match item {
        CalendarItem::Schedule(occ) => {
            let end = occ.timestamp.date().and_time(occ.end_time);
            if end > occ.timestamp {
                end
            } else {
                // End time at or before start means the slot runs past midnight.
                end + Duration::days(1)
            }
        }
        CalendarItem::Event(ev) => ev.timestamp + Duration::hours(1),
    }
}

// Position in the calendar keeps UIDs distinct for repeated slots and events.
fn uid(source_id: &str, start: NaiveDateTime, kind: &str, position: usize) -> String {
    format!(
        "{}-{}-{}-{}-gawwe",
        start.format("%Y%m%dT%H%M%S"),
        source_id.replace(' ', "-"),
        kind,
        position
    )
}
