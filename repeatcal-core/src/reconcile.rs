//! Whole-series edit planning.
//!
//! A whole-series edit is either metadata-only (one `update_series` call) or a
//! temporal shift, where every occurrence is translated by the same number of
//! days and given the edited times. A shift never re-expands the rule: it is a
//! uniform translation, and occurrences pushed past the series' end date are
//! dropped instead of updated.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::{EventId, EventSeed, Occurrence, SeriesId, SeriesPatch};

/// The two ways a whole-series edit can go, decided once per save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesEdit {
    /// Neither date nor times changed; only non-temporal fields are rewritten.
    MetadataOnly(SeriesPatch),
    /// Date or times changed; every occurrence is shifted and retimed.
    TemporalShift(TemporalShift),
}

impl SeriesEdit {
    /// Compare the edited slot with its pre-edit state.
    pub fn classify(edited: &EventSeed, reference: &EventSeed) -> Self {
        let date_changed = edited.date != reference.date;
        let time_changed =
            edited.start_time != reference.start_time || edited.end_time != reference.end_time;

        if !date_changed && !time_changed {
            return SeriesEdit::MetadataOnly(SeriesPatch::from(edited));
        }

        SeriesEdit::TemporalShift(TemporalShift {
            date_delta_days: (edited.date - reference.date).num_days(),
            template: edited.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalShift {
    /// Whole days between the reference date and the edited date
    pub date_delta_days: i64,
    /// Source of the new title, times and other metadata
    pub template: EventSeed,
}

impl TemporalShift {
    /// Split `series` into shifted updates and deletions past `end_date`.
    ///
    /// Survivors keep their ids and repeat rules, including the original end date.
    pub fn plan(
        &self,
        series_id: &SeriesId,
        series: &[Occurrence],
        end_date: Option<NaiveDate>,
    ) -> SeriesPlan {
        let mut plan = SeriesPlan::new(series_id.clone());

        for occurrence in series {
            let shifted = occurrence
                .seed
                .date
                .checked_add_signed(Duration::days(self.date_delta_days));

            match shifted {
                Some(date) if end_date.is_none_or(|end| date <= end) => {
                    tracing::debug!(
                        id = %occurrence.id,
                        from = %occurrence.seed.date,
                        to = %date,
                        "shifting occurrence"
                    );
                    plan.to_update.push(self.retimed(occurrence, date));
                }
                // Past the end date, or outside the representable range
                _ => {
                    tracing::debug!(
                        id = %occurrence.id,
                        from = %occurrence.seed.date,
                        end = ?end_date,
                        "dropping occurrence shifted past series end"
                    );
                    plan.to_delete.push(occurrence.id.clone());
                }
            }
        }

        plan
    }

    fn retimed(&self, occurrence: &Occurrence, date: NaiveDate) -> Occurrence {
        let template = &self.template;
        let seed = EventSeed {
            date,
            title: template.title.clone(),
            description: template.description.clone(),
            location: template.location.clone(),
            category: template.category.clone(),
            notification_time: template.notification_time,
            start_time: template.start_time,
            end_time: template.end_time,
            repeat: occurrence.seed.repeat.clone(),
        };
        Occurrence::new(occurrence.id.clone(), seed)
    }
}

/// Updates and deletions for one whole-series retime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPlan {
    pub series_id: SeriesId,
    pub to_update: Vec<Occurrence>,
    pub to_delete: Vec<EventId>,
}

impl SeriesPlan {
    pub fn new(series_id: SeriesId) -> Self {
        SeriesPlan {
            series_id,
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_update.is_empty() && self.to_delete.is_empty()
    }
}
