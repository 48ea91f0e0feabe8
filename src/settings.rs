use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::expander::{DuplicatePolicy, ScheduleExpander};
use crate::merger::CalendarMerger;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    pub timezone: String,
    pub calendar_name: String,
    pub max_range_days: u32,
    pub collapse_duplicates: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // GAWWE_AUTH_TOKEN, GAWWE_MAX_RANGE_DAYS, ...
            .add_source(
                Environment::with_prefix("GAWWE")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("timezone", "Asia/Jakarta")?
            .set_default("calendar_name", "Gawwe")?
            .set_default("max_range_days", 731)?
            .set_default("collapse_duplicates", false)?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Message(format!("Unknown timezone: {}", self.timezone)))
    }

    pub fn merger(&self) -> Result<CalendarMerger, ConfigError> {
        let duplicates = if self.collapse_duplicates {
            DuplicatePolicy::Collapse
        } else {
            DuplicatePolicy::Keep
        };
        Ok(CalendarMerger::new(ScheduleExpander::new(
            self.max_range_days,
            duplicates,
            self.tz()?,
        )))
    }
}
