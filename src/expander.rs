use std::collections::HashSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use crate::day_name::{parse_day_name, weekday_index};
use crate::error::{CalendarError, Diagnostic};
use crate::models::{ClassSession, Expansion, Occurrence, ScheduleEntry};

pub const DEFAULT_MAX_RANGE_DAYS: u32 = 731;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;

/// What to do with two occurrences of one class sharing a date and start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Keep,
    Collapse,
}

/// Turns a class's weekly schedule into dated occurrences.
///
/// Expansion only looks at the class's own start and end dates, so the same
/// input always yields the same output. Dates sent as full timestamps are read
/// on the calendar of `timezone`.
#[derive(Debug, Clone)]
pub struct ScheduleExpander {
    max_range_days: u32,
    duplicates: DuplicatePolicy,
    timezone: Tz,
}

impl Default for ScheduleExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RANGE_DAYS, DuplicatePolicy::Keep, DEFAULT_TIMEZONE)
    }
}

impl ScheduleExpander {
    pub fn new(max_range_days: u32, duplicates: DuplicatePolicy, timezone: Tz) -> Self {
        Self {
            max_range_days,
            duplicates,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn expand(&self, class: &ClassSession) -> Expansion {
        let mut expansion = Expansion::default();

        let (start, end) = match self.resolve_range(class) {
            Ok(range) => range,
            Err(err) => {
                expansion.diagnostics.push(Diagnostic::report(&class.id, err));
                return expansion;
            }
        };

        let mut seen: HashSet<(NaiveDate, NaiveTime)> = HashSet::new();
        for entry in &class.schedules {
            let (weekday, start_time, end_time) = match resolve_entry(entry) {
                Ok(resolved) => resolved,
                Err(err) => {
                    expansion.diagnostics.push(Diagnostic::report(&class.id, err));
                    continue;
                }
            };

            for date in weekly_dates(start, end, weekday) {
                if self.duplicates == DuplicatePolicy::Collapse && !seen.insert((date, start_time)) {
                    expansion.diagnostics.push(Diagnostic::report(
                        &class.id,
                        CalendarError::DuplicateOccurrence {
                            date,
                            start: start_time,
                        },
                    ));
                    continue;
                }
                expansion.occurrences.push(Occurrence {
                    class_id: class.id.clone(),
                    timestamp: NaiveDateTime::new(date, start_time),
                    title: class.name.clone(),
                    description: class.description.clone(),
                    start_time,
                    end_time,
                });
            }
        }

        expansion.occurrences.sort_by_key(|occ| occ.timestamp);
        debug!(
            class_id = %class.id,
            occurrences = expansion.occurrences.len(),
            "expanded class schedule"
        );
        expansion
    }

    fn resolve_range(&self, class: &ClassSession) -> Result<(NaiveDate, NaiveDate), CalendarError> {
        let start = parse_class_date(&class.start_date, self.timezone)?;
        let end = parse_class_date(&class.end_date, self.timezone)?;
        if start > end {
            return Err(CalendarError::InvalidDateRange { start, end });
        }
        let days = (end - start).num_days() + 1;
        if days > i64::from(self.max_range_days) {
            return Err(CalendarError::RangeTooLong {
                days,
                max: self.max_range_days,
            });
        }
        Ok((start, end))
    }
}

/// Every date in `[start, end]` falling on `weekday`, in ascending order.
///
/// Returns nothing when `start > end`.
pub fn weekly_dates(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if start > end {
        return dates;
    }

    let offset = (weekday_index(weekday) + 7 - weekday_index(start.weekday())) % 7;
    let mut cursor = start.checked_add_days(Days::new(offset.into()));
    while let Some(date) = cursor.filter(|d| *d <= end) {
        dates.push(date);
        cursor = date.checked_add_days(Days::new(7));
    }
    dates
}

fn resolve_entry(entry: &ScheduleEntry) -> Result<(Weekday, NaiveTime, NaiveTime), CalendarError> {
    let weekday = parse_day_name(&entry.day)?;
    let start = parse_wall_time(&entry.start_time)?;
    let end = parse_wall_time(&entry.end_time)?;
    Ok((weekday, start, end))
}

impl Expansion {
    /// Keeps occurrences dated within `[from, to]`; an open bound is unbounded.
    pub fn within(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.occurrences
            .retain(|occ| in_window(occ.timestamp.date(), from, to));
        self
    }
}

pub(crate) fn in_window(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
}

/// Accepts `YYYY-MM-DD`, or a full timestamp whose date on the `timezone`
/// calendar is used. Offset-carrying timestamps are shifted first, the same
/// way event timestamps are.
pub(crate) fn parse_class_date(value: &str, timezone: Tz) -> Result<NaiveDate, CalendarError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&timezone).date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|_| CalendarError::MalformedClassDate(value.to_string()))
}

pub(crate) fn parse_wall_time(value: &str) -> Result<NaiveTime, CalendarError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| CalendarError::MalformedTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;

    fn entry(day: &str, start: &str, end: &str) -> ScheduleEntry {
        ScheduleEntry {
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn class(start: &str, end: &str, schedules: Vec<ScheduleEntry>) -> ClassSession {
        ClassSession {
            id: "class-1".to_string(),
            name: "Japanese N4".to_string(),
            description: "JLPT N4 preparation".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            schedules,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_japanese_n4_three_mondays() {
        let class = class(
            "2024-01-01",
            "2024-01-21",
            vec![entry("SENIN", "19:00:00", "21:00:00")],
        );
        let expansion = ScheduleExpander::default().expand(&class);
        let dates: Vec<NaiveDate> = expansion
            .occurrences
            .iter()
            .map(|o| o.timestamp.date())
            .collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]
        );
        assert!(expansion.diagnostics.is_empty());

        let first = &expansion.occurrences[0];
        assert_eq!(first.title, "Japanese N4");
        assert_eq!(first.description, "JLPT N4 preparation");
        assert_eq!(first.timestamp.time(), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
        assert_eq!(first.end_time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn test_single_day_range_matching_weekday() {
        // 2024-01-03 is a Wednesday
        let class = class("2024-01-03", "2024-01-03", vec![entry("RABU", "10:00", "11:00")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert_eq!(expansion.occurrences.len(), 1);
        assert_eq!(expansion.occurrences[0].timestamp.date(), date(2024, 1, 3));
    }

    #[test]
    fn test_start_after_end_is_empty() {
        let class = class("2024-02-01", "2024-01-01", vec![entry("SENIN", "10:00", "11:00")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::InvalidDateRange);
    }

    #[test]
    fn test_seven_day_window_yields_one_per_weekday() {
        // 2024-01-04 (Thu) .. 2024-01-10 (Wed): every weekday appears once
        for day in ["MINGGU", "SENIN", "SELASA", "RABU", "KAMIS", "JUMAT", "SABTU"] {
            let class = class("2024-01-04", "2024-01-10", vec![entry(day, "08:00", "09:00")]);
            let expansion = ScheduleExpander::default().expand(&class);
            assert_eq!(expansion.occurrences.len(), 1, "weekday {day}");
        }
    }

    #[test]
    fn test_window_missing_weekday() {
        // 2024-01-01 (Mon) .. 2024-01-03 (Wed) has no Friday
        let class = class("2024-01-01", "2024-01-03", vec![entry("JUMAT", "08:00", "09:00")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn test_end_date_inclusive() {
        // 2024-01-22 is a Monday
        let class = class("2024-01-01", "2024-01-22", vec![entry("SENIN", "19:00", "21:00")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert_eq!(expansion.occurrences.len(), 4);
        assert_eq!(expansion.occurrences[3].timestamp.date(), date(2024, 1, 22));
    }

    #[test]
    fn test_no_schedule_entries() {
        let class = class("2024-01-01", "2024-03-01", vec![]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_weekday_skips_only_that_entry() {
        let class = class(
            "2024-01-01",
            "2024-01-21",
            vec![
                entry("SENNIN", "19:00:00", "21:00:00"),
                entry("RABU", "19:00:00", "21:00:00"),
            ],
        );
        let expansion = ScheduleExpander::default().expand(&class);
        assert_eq!(expansion.occurrences.len(), 3);
        assert!(
            expansion
                .occurrences
                .iter()
                .all(|o| o.timestamp.weekday() == Weekday::Wed)
        );
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::UnknownWeekday);
    }

    #[test]
    fn test_malformed_time_skips_entry() {
        let class = class("2024-01-01", "2024-01-07", vec![entry("SENIN", "7pm", "9pm")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::MalformedTime);
    }

    #[test]
    fn test_malformed_class_date() {
        let class = class("01/01/2024", "2024-01-07", vec![entry("SENIN", "19:00", "21:00")]);
        let expansion = ScheduleExpander::default().expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::MalformedClassDate);
    }

    #[test]
    fn test_timestamp_class_dates_use_date_part() {
        let class = class(
            "2024-01-01T00:00:00.000Z",
            "2024-01-08T00:00:00.000Z",
            vec![entry("SENIN", "19:00", "21:00")],
        );
        let expansion = ScheduleExpander::default().expand(&class);
        assert_eq!(expansion.occurrences.len(), 2);
    }

    #[test]
    fn test_range_too_long() {
        let expander = ScheduleExpander::new(30, DuplicatePolicy::Keep, DEFAULT_TIMEZONE);
        let class = class("2024-01-01", "2024-03-01", vec![entry("SENIN", "19:00", "21:00")]);
        let expansion = expander.expand(&class);
        assert!(expansion.occurrences.is_empty());
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::RangeTooLong);
        assert!(expansion.diagnostics[0].message.contains("GAWWE_MAX_RANGE_DAYS"));
    }

    #[test]
    fn test_utc_timestamps_read_on_local_calendar() {
        // Jakarta midnight of Mon 01-01 and Mon 01-08, serialised as UTC
        let class = class(
            "2023-12-31T17:00:00.000Z",
            "2024-01-07T17:00:00.000Z",
            vec![entry("SENIN", "19:00", "21:00")],
        );
        let expansion = ScheduleExpander::default().expand(&class);
        let dates: Vec<NaiveDate> = expansion
            .occurrences
            .iter()
            .map(|o| o.timestamp.date())
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 8)]);

        let utc = ScheduleExpander::new(DEFAULT_MAX_RANGE_DAYS, DuplicatePolicy::Keep, chrono_tz::UTC);
        assert_eq!(utc.expand(&class).occurrences.len(), 1);
    }

    #[test]
    fn test_expansion_within_window() {
        let class = class("2024-01-01", "2024-01-31", vec![entry("SENIN", "19:00", "21:00")]);
        let expansion = ScheduleExpander::default()
            .expand(&class)
            .within(Some(date(2024, 1, 8)), Some(date(2024, 1, 22)));
        let dates: Vec<NaiveDate> = expansion
            .occurrences
            .iter()
            .map(|o| o.timestamp.date())
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]);
    }

    #[test]
    fn test_duplicate_entries_kept_by_default() {
        let class = class(
            "2024-01-01",
            "2024-01-07",
            vec![
                entry("SENIN", "19:00", "21:00"),
                entry("MONDAY", "19:00", "21:00"),
            ],
        );
        let expansion = ScheduleExpander::default().expand(&class);
        assert_eq!(expansion.occurrences.len(), 2);
    }

    #[test]
    fn test_duplicate_entries_collapsed_by_date_and_start() {
        let expander = ScheduleExpander::new(
            DEFAULT_MAX_RANGE_DAYS,
            DuplicatePolicy::Collapse,
            DEFAULT_TIMEZONE,
        );
        let class = class(
            "2024-01-01",
            "2024-01-07",
            vec![
                entry("SENIN", "19:00", "21:00"),
                entry("SENIN", "19:00", "21:00"),
                entry("SENIN", "08:00", "09:00"),
            ],
        );
        let expansion = expander.expand(&class);
        let times: Vec<NaiveTime> = expansion.occurrences.iter().map(|o| o.start_time).collect();
        assert_eq!(
            times,
            vec![
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(19, 0, 0).unwrap()
            ]
        );
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::DuplicateOccurrence);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let class = class(
            "2024-01-01",
            "2024-02-29",
            vec![entry("SELASA", "18:00", "19:30"), entry("KAMIS", "18:00", "19:30")],
        );
        let expander = ScheduleExpander::default();
        assert_eq!(expander.expand(&class), expander.expand(&class));
    }

    #[test]
    fn test_weekly_dates_reversed_range() {
        assert!(weekly_dates(date(2024, 1, 10), date(2024, 1, 1), Weekday::Mon).is_empty());
    }
}
