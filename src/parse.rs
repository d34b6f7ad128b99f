//! Argument parsers shared by the commands. Each returns `Result<_, String>`
//! so clap can use it as a `value_parser`.

use chrono::{Duration, Local, NaiveDate, NaiveTime};

/// `YYYY-MM-DD`, `today` or `tomorrow`.
pub fn date(input: &str) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    date_relative_to(input, today)
}

fn date_relative_to(input: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            format!("Invalid date '{input}'. Expected YYYY-MM-DD, today or tomorrow")
        }),
    }
}

/// `HH:MM`.
pub fn time(input: &str) -> Result<NaiveTime, String> {
    repeatcal_core::parse_time(input.trim())
}

/// Notification lead time in whole minutes: a duration like `10m` or `1h`,
/// or a bare number of minutes.
pub fn notify_minutes(input: &str) -> Result<u32, String> {
    let input = input.trim();
    if let Ok(minutes) = input.parse::<u32>() {
        return Ok(minutes);
    }

    let duration = humantime::parse_duration(input)
        .map_err(|e| format!("Invalid notification time '{input}': {e}"))?;
    u32::try_from(duration.as_secs() / 60)
        .map_err(|_| format!("Notification time '{input}' is too long"))
}
