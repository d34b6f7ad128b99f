use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use owo_colors::OwoColorize;
use repeatcal_core::operations::{EventData, EventOperations};
use repeatcal_core::store::EventStore;
use repeatcal_core::{EventId, Occurrence};

use crate::commands::RepeatArgs;
use crate::parse;

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    pub id: String,

    /// Apply the edit to every occurrence of the event's series
    #[arg(long)]
    pub all: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_parser = parse::date)]
    pub date: Option<NaiveDate>,

    #[arg(long, value_parser = parse::time)]
    pub start: Option<NaiveTime>,

    #[arg(long, value_parser = parse::time)]
    pub end: Option<NaiveTime>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_parser = parse::notify_minutes)]
    pub notify: Option<u32>,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

impl EditArgs {
    /// The edited copy of `current`.
    ///
    /// Editing one occurrence of a series takes it out of the series unless
    /// repeat flags say otherwise. A whole-series edit keeps the rule as is.
    pub fn apply(&self, current: &Occurrence, whole_series: bool) -> Result<Occurrence> {
        let mut edited = current.clone();
        let seed = &mut edited.seed;

        if let Some(title) = &self.title {
            seed.title = title.clone();
        }
        if let Some(date) = self.date {
            seed.date = date;
        }
        if let Some(start) = self.start {
            seed.start_time = start;
        }
        if let Some(end) = self.end {
            seed.end_time = end;
        }
        if let Some(description) = &self.description {
            seed.description = description.clone();
        }
        if let Some(location) = &self.location {
            seed.location = location.clone();
        }
        if let Some(category) = &self.category {
            seed.category = category.clone();
        }
        if let Some(minutes) = self.notify {
            seed.notification_time = minutes;
        }

        if seed.end_time <= seed.start_time {
            anyhow::bail!(
                "End time {} must be after start time {}",
                seed.end_time.format("%H:%M"),
                seed.start_time.format("%H:%M")
            );
        }

        if whole_series {
            if !self.repeat.is_empty() {
                anyhow::bail!(
                    "Repeat settings can't be changed for a whole series. \
                    Edit a single occurrence, or delete the series and create it again"
                );
            }
        } else if current.seed.repeat.is_recurring() || !self.repeat.is_empty() {
            seed.repeat = self.repeat.rule_from(&current.seed.repeat)?;
        }

        Ok(edited)
    }
}

pub async fn run<S: EventStore>(ops: &mut EventOperations<S>, args: &EditArgs) -> Result<()> {
    ops.refresh().await?;

    let id = EventId(args.id.clone());
    let current = ops
        .find(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Event '{}' not found", args.id))?;

    let whole_series = args.all && current.series_id().is_some();
    if args.all && !whole_series {
        eprintln!(
            "{}",
            "  Not part of a recurring series; editing this event only".dimmed()
        );
    }

    let edited = args.apply(&current, whole_series)?;
    let title = edited.seed.title.clone();
    ops.save(EventData::Existing(edited), whole_series).await?;

    let scope = if whole_series { " (whole series)" } else { "" };
    println!("{}", format!("  Updated: {title}{scope}").yellow());

    Ok(())
}
