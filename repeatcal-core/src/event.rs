//! Event model shared by the generator, the reconciler and every store.
//!
//! An `EventSeed` is the template for one occurrence. Expanding a recurring
//! seed produces more seeds that differ only in `date`; the store turns each
//! into an `Occurrence` by assigning an `EventId` (and a `SeriesId` for
//! recurring batches).

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistence identity of a single occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn generate() -> Self {
        EventId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId(s.to_string())
    }
}

/// Identity shared by every occurrence of one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub String);

impl SeriesId {
    pub fn generate() -> Self {
        SeriesId(format!("repeat-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        SeriesId(s.to_string())
    }
}

/// The unit a repeat rule steps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeatKind::None => "none",
            RepeatKind::Daily => "daily",
            RepeatKind::Weekly => "weekly",
            RepeatKind::Monthly => "monthly",
            RepeatKind::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

impl FromStr for RepeatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(RepeatKind::None),
            "daily" => Ok(RepeatKind::Daily),
            "weekly" => Ok(RepeatKind::Weekly),
            "monthly" => Ok(RepeatKind::Monthly),
            "yearly" => Ok(RepeatKind::Yearly),
            other => Err(format!(
                "Unknown repeat type '{other}'. Expected none, daily, weekly, monthly or yearly"
            )),
        }
    }
}

/// Parameters of a recurring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    /// Step count in the rule's unit
    pub interval: NonZeroU32,
    /// Inclusive bound; a rule without one is never expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Assigned by the store when the series is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SeriesId>,
}

impl Recurrence {
    pub fn new(interval: NonZeroU32, end_date: Option<NaiveDate>) -> Self {
        Recurrence {
            interval,
            end_date,
            id: None,
        }
    }
}

/// How an event repeats. `None` carries neither a series id nor an end date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepeatRule {
    #[default]
    None,
    Daily(Recurrence),
    Weekly(Recurrence),
    Monthly(Recurrence),
    Yearly(Recurrence),
}

impl RepeatRule {
    /// Build a rule of the given kind. `RepeatKind::None` drops the recurrence.
    pub fn new(kind: RepeatKind, recurrence: Recurrence) -> Self {
        match kind {
            RepeatKind::None => RepeatRule::None,
            RepeatKind::Daily => RepeatRule::Daily(recurrence),
            RepeatKind::Weekly => RepeatRule::Weekly(recurrence),
            RepeatKind::Monthly => RepeatRule::Monthly(recurrence),
            RepeatKind::Yearly => RepeatRule::Yearly(recurrence),
        }
    }

    pub fn kind(&self) -> RepeatKind {
        match self {
            RepeatRule::None => RepeatKind::None,
            RepeatRule::Daily(_) => RepeatKind::Daily,
            RepeatRule::Weekly(_) => RepeatKind::Weekly,
            RepeatRule::Monthly(_) => RepeatKind::Monthly,
            RepeatRule::Yearly(_) => RepeatKind::Yearly,
        }
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        match self {
            RepeatRule::None => None,
            RepeatRule::Daily(r)
            | RepeatRule::Weekly(r)
            | RepeatRule::Monthly(r)
            | RepeatRule::Yearly(r) => Some(r),
        }
    }

    fn recurrence_mut(&mut self) -> Option<&mut Recurrence> {
        match self {
            RepeatRule::None => None,
            RepeatRule::Daily(r)
            | RepeatRule::Weekly(r)
            | RepeatRule::Monthly(r)
            | RepeatRule::Yearly(r) => Some(r),
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, RepeatRule::None)
    }

    pub fn series_id(&self) -> Option<&SeriesId> {
        self.recurrence().and_then(|r| r.id.as_ref())
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.recurrence().and_then(|r| r.end_date)
    }

    /// Attach (or clear) the series id. A no-op on `None`.
    pub fn set_series_id(&mut self, id: Option<SeriesId>) {
        if let Some(r) = self.recurrence_mut() {
            r.id = id;
        }
    }

    /// Copy of this rule with no series id, ready to seed a new series.
    pub fn detached(&self) -> Self {
        let mut rule = self.clone();
        rule.set_series_id(None);
        rule
    }
}

/// Template for a single occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSeed {
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    /// Minutes before the start to notify
    #[serde(default)]
    pub notification_time: u32,
    #[serde(default)]
    pub repeat: RepeatRule,
}

impl EventSeed {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        EventSeed {
            title: title.into(),
            date,
            start_time,
            end_time,
            description: String::new(),
            location: String::new(),
            category: String::new(),
            notification_time: 0,
            repeat: RepeatRule::None,
        }
    }

    /// This seed moved to another date, every other field untouched.
    pub fn on(&self, date: NaiveDate) -> Self {
        EventSeed {
            date,
            ..self.clone()
        }
    }

    pub fn series_id(&self) -> Option<&SeriesId> {
        self.repeat.series_id()
    }
}

impl fmt::Display for EventSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{}",
            self.date,
            self.title,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: EventId,
    #[serde(flatten)]
    pub seed: EventSeed,
}

impl Occurrence {
    pub fn new(id: EventId, seed: EventSeed) -> Self {
        Occurrence { id, seed }
    }

    pub fn series_id(&self) -> Option<&SeriesId> {
        self.seed.series_id()
    }

    pub fn belongs_to(&self, series_id: &SeriesId) -> bool {
        self.series_id() == Some(series_id)
    }
}

/// Partial update of one event. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatRule>,
}

impl EventPatch {
    pub fn apply(&self, seed: &mut EventSeed) {
        if let Some(title) = &self.title {
            seed.title = title.clone();
        }
        if let Some(date) = self.date {
            seed.date = date;
        }
        if let Some(start) = self.start_time {
            seed.start_time = start;
        }
        if let Some(end) = self.end_time {
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
        if let Some(minutes) = self.notification_time {
            seed.notification_time = minutes;
        }
        if let Some(repeat) = &self.repeat {
            seed.repeat = repeat.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }
}

impl From<&EventSeed> for EventPatch {
    /// A patch that overwrites every field with the seed's value.
    fn from(seed: &EventSeed) -> Self {
        EventPatch {
            title: Some(seed.title.clone()),
            date: Some(seed.date),
            start_time: Some(seed.start_time),
            end_time: Some(seed.end_time),
            description: Some(seed.description.clone()),
            location: Some(seed.location.clone()),
            category: Some(seed.category.clone()),
            notification_time: Some(seed.notification_time),
            repeat: Some(seed.repeat.clone()),
        }
    }
}

/// Partial update applied to every occurrence of a series.
/// Only non-temporal fields; dates and times stay per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<u32>,
}

impl SeriesPatch {
    pub fn apply(&self, seed: &mut EventSeed) {
        if let Some(title) = &self.title {
            seed.title = title.clone();
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
        if let Some(minutes) = self.notification_time {
            seed.notification_time = minutes;
        }
    }
}

impl From<&EventSeed> for SeriesPatch {
    fn from(seed: &EventSeed) -> Self {
        SeriesPatch {
            title: Some(seed.title.clone()),
            description: Some(seed.description.clone()),
            location: Some(seed.location.clone()),
            category: Some(seed.category.clone()),
            notification_time: Some(seed.notification_time),
        }
    }
}

/// `NaiveTime` as `HH:MM` on the wire. Seconds are accepted when reading.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(s: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map_err(|_| format!("Invalid time '{s}'. Expected HH:MM"))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Parse an `HH:MM` time the way the wire format does.
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    hhmm::parse(s)
}
