use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use owo_colors::OwoColorize;
use repeatcal_core::Occurrence;
use repeatcal_core::operations::EventOperations;
use repeatcal_core::protocol::EventBatch;
use repeatcal_core::store::EventStore;

use crate::render::Render;

/// Days shown when --to is omitted
const DEFAULT_SPAN_DAYS: i64 = 7;

pub async fn run<S: EventStore>(
    ops: &mut EventOperations<S>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let from = from.unwrap_or(today);
    let to = to.unwrap_or_else(|| default_end(from));

    let events = in_range(ops.refresh().await?, from, to);

    if json {
        println!("{}", serde_json::to_string_pretty(&EventBatch::new(events))?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day and print
    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        if current_date != Some(event.seed.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(event.seed.date, today).bold());
            current_date = Some(event.seed.date);
        }
        println!("{}", event.render());
    }

    Ok(())
}

/// End of the window shown when --to is omitted, clamped at the last
/// representable date.
fn default_end(from: NaiveDate) -> NaiveDate {
    from.checked_add_signed(Duration::days(DEFAULT_SPAN_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Events dated within `from..=to`, ordered by date then start time.
fn in_range(events: &[Occurrence], from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
    let mut events: Vec<Occurrence> = events
        .iter()
        .filter(|e| (from..=to).contains(&e.seed.date))
        .cloned()
        .collect();
    events.sort_by_key(|e| (e.seed.date, e.seed.start_time));
    events
}

/// "Today", "Tomorrow", or e.g. "Wed Feb 25"
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}
