//! Terminal rendering for repeatcal-core types, using owo_colors.

use owo_colors::OwoColorize;
use repeatcal_core::{EventSeed, Occurrence, Recurrence, RepeatKind, RepeatRule};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for RepeatRule {
    fn render(&self) -> String {
        match self.recurrence() {
            Some(recurrence) => format!("↻ {}", describe(self.kind(), recurrence))
                .cyan()
                .to_string(),
            None => String::new(),
        }
    }
}

/// One line inside a day group: time span, title, repeat badge, id.
impl Render for Occurrence {
    fn render(&self) -> String {
        let seed = &self.seed;
        let mut line = format!("  {} {}", time_span(seed), seed.title);

        if seed.repeat.is_recurring() {
            line.push(' ');
            line.push_str(&seed.repeat.render());
        }
        format!("{line} {}", format!("[{}]", self.id).dimmed())
    }
}

/// A not-yet-saved seed, for expansion previews.
impl Render for EventSeed {
    fn render(&self) -> String {
        format!(
            "  {} {} {}",
            self.date.format("%a %Y-%m-%d").bold(),
            time_span(self),
            self.title
        )
    }
}

fn time_span(seed: &EventSeed) -> String {
    format!(
        "{}-{}",
        seed.start_time.format("%H:%M"),
        seed.end_time.format("%H:%M")
    )
}

/// "weekly", "every 2 months until 2025-12-31", ...
pub fn describe(kind: RepeatKind, recurrence: &Recurrence) -> String {
    let interval = recurrence.interval.get();
    let mut text = if interval == 1 {
        kind.to_string()
    } else {
        let unit = match kind {
            RepeatKind::Daily => "days",
            RepeatKind::Weekly => "weeks",
            RepeatKind::Monthly => "months",
            RepeatKind::Yearly => "years",
            RepeatKind::None => "",
        };
        format!("every {interval} {unit}")
    };

    if let Some(end) = recurrence.end_date {
        text.push_str(&format!(" until {end}"));
    }
    text
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_describe_single_step() {
        let recurrence = Recurrence::new(NonZeroU32::new(1).unwrap(), None);
        assert_eq!(describe(RepeatKind::Weekly, &recurrence), "weekly");
    }

    #[test]
    fn test_describe_interval_and_end() {
        let recurrence = Recurrence::new(
            NonZeroU32::new(2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31),
        );
        assert_eq!(
            describe(RepeatKind::Monthly, &recurrence),
            "every 2 months until 2025-12-31"
        );
    }

    #[test]
    fn test_none_rule_renders_empty() {
        assert_eq!(RepeatRule::None.render(), "");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }
}
