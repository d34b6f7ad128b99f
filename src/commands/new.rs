use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use owo_colors::OwoColorize;
use repeatcal_core::EventSeed;
use repeatcal_core::operations::{EventData, EventOperations};
use repeatcal_core::store::EventStore;

use crate::commands::RepeatArgs;
use crate::parse;
use crate::render::{describe, pluralize};

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    pub title: String,

    /// Date of the (first) occurrence
    #[arg(long, value_parser = parse::date)]
    pub date: NaiveDate,

    /// Start time (HH:MM)
    #[arg(long, value_parser = parse::time)]
    pub start: NaiveTime,

    /// End time (HH:MM)
    #[arg(long, value_parser = parse::time)]
    pub end: NaiveTime,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub location: String,

    #[arg(long, default_value = "")]
    pub category: String,

    /// How long before the start to notify (e.g. 10m, 1h)
    #[arg(long, value_parser = parse::notify_minutes, default_value = "10m")]
    pub notify: u32,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

impl NewArgs {
    pub fn seed(&self) -> Result<EventSeed> {
        if self.end <= self.start {
            anyhow::bail!(
                "End time {} must be after start time {}",
                self.end.format("%H:%M"),
                self.start.format("%H:%M")
            );
        }

        let mut seed = EventSeed::new(self.title.clone(), self.date, self.start, self.end);
        seed.description = self.description.clone();
        seed.location = self.location.clone();
        seed.category = self.category.clone();
        seed.notification_time = self.notify;
        seed.repeat = self.repeat.rule()?;
        Ok(seed)
    }
}

pub async fn run<S: EventStore>(ops: &mut EventOperations<S>, args: &NewArgs) -> Result<()> {
    let seed = args.seed()?;
    let title = seed.title.clone();
    let repeat = seed.repeat.clone();

    ops.refresh().await?;
    let before = ops.events().len();
    ops.save(EventData::New(seed), false).await?;

    match repeat.recurrence() {
        Some(recurrence) => {
            let created = ops.events().len().saturating_sub(before);
            println!(
                "{}",
                format!(
                    "  Created: {title} ({created} {}, {})",
                    pluralize("occurrence", created),
                    describe(repeat.kind(), recurrence)
                )
                .green()
            );
        }
        None => println!("{}", format!("  Created: {title}").green()),
    }

    Ok(())
}
