use chrono::Weekday;

use crate::error::CalendarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Id,
    En,
}

/// Resolves a weekday label as stored by the class-management layer.
///
/// Indonesian tokens (`SENIN`, `SELASA`, ...) are canonical; English names are
/// accepted too since the UI is bilingual. Matching ignores case and
/// surrounding whitespace. Anything else is rejected rather than defaulted.
pub fn parse_day_name(label: &str) -> Result<Weekday, CalendarError> {
    let token = label.trim().to_ascii_uppercase();
    let weekday = match token.as_str() {
        "MINGGU" | "SUNDAY" => Weekday::Sun,
        "SENIN" | "MONDAY" => Weekday::Mon,
        "SELASA" | "TUESDAY" => Weekday::Tue,
        "RABU" | "WEDNESDAY" => Weekday::Wed,
        "KAMIS" | "THURSDAY" => Weekday::Thu,
        "JUMAT" | "JUM'AT" | "FRIDAY" => Weekday::Fri,
        "SABTU" | "SATURDAY" => Weekday::Sat,
        _ => return Err(CalendarError::UnknownWeekday(label.to_string())),
    };
    Ok(weekday)
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}

pub fn day_label(weekday: Weekday, locale: Locale) -> &'static str {
    match (locale, weekday) {
        (Locale::Id, Weekday::Sun) => "Minggu",
        (Locale::Id, Weekday::Mon) => "Senin",
        (Locale::Id, Weekday::Tue) => "Selasa",
        (Locale::Id, Weekday::Wed) => "Rabu",
        (Locale::Id, Weekday::Thu) => "Kamis",
        (Locale::Id, Weekday::Fri) => "Jumat",
        (Locale::Id, Weekday::Sat) => "Sabtu",
        (Locale::En, Weekday::Sun) => "Sunday",
        (Locale::En, Weekday::Mon) => "Monday",
        (Locale::En, Weekday::Tue) => "Tuesday",
        (Locale::En, Weekday::Wed) => "Wednesday",
        (Locale::En, Weekday::Thu) => "Thursday",
        (Locale::En, Weekday::Fri) => "Friday",
        (Locale::En, Weekday::Sat) => "Saturday",
    }
}
