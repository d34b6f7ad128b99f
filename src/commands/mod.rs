pub mod config;
pub mod delete;
pub mod edit;
pub mod expand;
pub mod list;
pub mod new;

use std::num::NonZeroU32;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use repeatcal_core::{Recurrence, RepeatKind, RepeatRule};

use crate::parse;

/// Repeat flags shared by `new`, `edit` and `expand`.
#[derive(Args, Debug, Clone, Default)]
pub struct RepeatArgs {
    /// none, daily, weekly, monthly or yearly
    #[arg(long)]
    pub repeat: Option<RepeatKind>,

    /// Step between occurrences, in units of --repeat
    #[arg(long)]
    pub interval: Option<NonZeroU32>,

    /// Last date an occurrence may fall on (YYYY-MM-DD)
    #[arg(long, value_parser = parse::date)]
    pub until: Option<NaiveDate>,
}

impl RepeatArgs {
    pub fn is_empty(&self) -> bool {
        self.repeat.is_none() && self.interval.is_none() && self.until.is_none()
    }

    /// The rule for a brand new event.
    pub fn rule(&self) -> Result<RepeatRule> {
        match self.repeat {
            None | Some(RepeatKind::None) => {
                if self.interval.is_some() || self.until.is_some() {
                    anyhow::bail!("--interval and --until need --repeat");
                }
                Ok(RepeatRule::None)
            }
            Some(kind) => Ok(RepeatRule::new(
                kind,
                Recurrence::new(self.interval.unwrap_or(NonZeroU32::MIN), self.until),
            )),
        }
    }

    /// The rule for an edited occurrence, starting from its current rule.
    ///
    /// The result never carries a series id: an edited occurrence either leaves
    /// its series or starts a new one.
    pub fn rule_from(&self, current: &RepeatRule) -> Result<RepeatRule> {
        let kind = match self.repeat {
            Some(kind) => kind,
            // Untouched repeat flags mean "just this one"
            None if self.interval.is_none() && self.until.is_none() => return Ok(RepeatRule::None),
            None => current.kind(),
        };

        if kind == RepeatKind::None {
            if self.interval.is_some() || self.until.is_some() {
                anyhow::bail!("--interval and --until need a repeating --repeat");
            }
            return Ok(RepeatRule::None);
        }

        let base = current.recurrence();
        let interval = self
            .interval
            .or(base.map(|r| r.interval))
            .unwrap_or(NonZeroU32::MIN);
        let until = self.until.or(base.and_then(|r| r.end_date));

        Ok(RepeatRule::new(kind, Recurrence::new(interval, until)))
    }
}
