use chrono::NaiveDate;

use crate::error::ApiError;

/// Checks an optional `[from, to]` output window.
pub fn validate_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    max_days: u32,
) -> Result<(), ApiError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ApiError::BadRequest("from must not be after to".into()));
        }
        if (to - from).num_days() + 1 > i64::from(max_days) {
            return Err(ApiError::BadRequest(format!(
                "window must not exceed {max_days} days"
            )));
        }
    }
    Ok(())
}
