//! Talks and speaking engagements.
//!
//! Raw records come straight from the data file. [`normalize`] links every
//! event to its talk, hides events whose talk cannot be found, drops
//! deprecated talks and orders both collections. [`classify`] then splits
//! the visible events around a reference instant.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::Deserialize;
use serde_yaml_ng::Value;
use thiserror::Error;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

use super::error::DomainError;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");
const CALENDAR_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
// YAML timestamps: one-digit hours, fractional seconds and a space before the offset.
const OFFSET_DATETIME_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!(
        "[year]-[month]-[day] [hour padding:none]:[minute]:[second][optional [.[subsecond]]] [offset_hour sign:mandatory padding:none][optional [:[offset_minute]]]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour padding:none]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory padding:none][optional [:[offset_minute]]]"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour padding:none]:[minute]:[second][optional [.[subsecond]]] [offset_hour sign:mandatory padding:none][optional [:[offset_minute]]]"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour padding:none]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory padding:none][optional [:[offset_minute]]]"
    ),
];
const NAIVE_DATETIME_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!(
        "[year]-[month]-[day] [hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]] Z"
    ),
    format_description!(
        "[year]-[month]-[day] [hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]]Z"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour padding:none]:[minute][optional [:[second][optional [.[subsecond]]]]]Z"
    ),
];

/// The data file as written: an event list and a keyed talk catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngagementDocument {
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub talks: BTreeMap<String, RawTalk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub date: RawDate,
    #[serde(default)]
    pub talk: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTalk {
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slides: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A date as it appears in the data file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    Text(String),
}

/// Display order of a talk.
///
/// Numbers compare numerically and text lexicographically; any number
/// orders before any text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(right),
            (SortKey::Text(left), SortKey::Text(right)) => left.cmp(right),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Talk {
    pub key: String,
    pub sort: Option<SortKey>,
    pub deprecated: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slides: Option<String>,
    pub video: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl Talk {
    pub fn from_raw(key: impl Into<String>, raw: RawTalk) -> Self {
        let RawTalk {
            sort,
            deprecated,
            title,
            description,
            slides,
            video,
            extra,
        } = raw;

        Self {
            key: key.into(),
            sort,
            deprecated,
            title,
            description,
            slides,
            video,
            extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDate {
    pub instant: OffsetDateTime,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub date: EventDate,
    pub talk: Option<Talk>,
    pub hidden: bool,
    pub name: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

/// Visible events in chronological order and active talks in display order.
#[derive(Debug, Clone, Default)]
pub struct Engagements {
    pub events: Vec<Event>,
    pub talks: Vec<Talk>,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub past: Vec<Event>,
    pub upcoming: Vec<Event>,
}

#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub events: Schedule,
    pub talks: Vec<Talk>,
}

#[derive(Debug, Error)]
pub enum EventDateError {
    #[error("unrecognized event date `{input}`")]
    Unrecognized { input: String },
    #[error("event timestamp {millis}ms is out of range")]
    OutOfRange { millis: i64 },
    #[error("failed to format event date: {0}")]
    Format(#[from] time::error::Format),
}

pub type TalkCatalog = BTreeMap<String, Talk>;

pub fn catalog(talks: BTreeMap<String, RawTalk>) -> TalkCatalog {
    talks
        .into_iter()
        .map(|(key, raw)| {
            let talk = Talk::from_raw(key.clone(), raw);
            (key, talk)
        })
        .collect()
}

/// Link, filter and order the raw document.
pub fn normalize(document: EngagementDocument) -> Result<Engagements, DomainError> {
    let EngagementDocument { events, talks } = document;
    let catalog = catalog(talks);

    let mut visible = Vec::with_capacity(events.len());
    for (position, raw) in events.into_iter().enumerate() {
        let event = resolve_event(raw, &catalog).map_err(|err| {
            let message = format!("events[{position}]: {err}");
            match err {
                EventDateError::Format(_) => DomainError::invariant(message),
                _ => DomainError::validation(message),
            }
        })?;
        if !event.hidden {
            visible.push(event);
        }
    }
    visible.sort_by_key(|event| event.date.instant.unix_timestamp_nanos());

    let mut talks: Vec<Talk> = catalog
        .into_values()
        .filter(|talk| !talk.deprecated)
        .collect();
    talks.sort_by(|left, right| compare_sort(left.sort.as_ref(), right.sort.as_ref()));

    Ok(Engagements {
        events: visible,
        talks,
    })
}

/// Normalize one event against the talk catalog.
///
/// An event whose talk key is absent or unknown is hidden and detached
/// from any talk. Deprecated talks still resolve.
pub fn resolve_event(raw: RawEvent, catalog: &TalkCatalog) -> Result<Event, EventDateError> {
    let RawEvent {
        date,
        talk,
        hidden,
        name,
        location,
        url,
        extra,
    } = raw;

    let talk = talk.and_then(|key| catalog.get(&key).cloned());
    let hidden = hidden || talk.is_none();

    let instant = parse_event_date(&date)?;
    let formatted = format_human_date(instant)?;

    Ok(Event {
        date: EventDate { instant, formatted },
        talk,
        hidden,
        name,
        location,
        url,
        extra,
    })
}

/// Split events at `now`: anything at or before it is past.
pub fn classify(engagements: Engagements, now: OffsetDateTime) -> Classified {
    let Engagements { events, talks } = engagements;
    let (past, upcoming): (Vec<Event>, Vec<Event>) = events
        .into_iter()
        .partition(|event| event.date.instant <= now);

    Classified {
        events: Schedule { past, upcoming },
        talks,
    }
}

/// Parse a raw event date into a UTC instant.
///
/// Calendar dates and datetimes without an offset are taken as UTC.
pub fn parse_event_date(raw: &RawDate) -> Result<OffsetDateTime, EventDateError> {
    match raw {
        RawDate::EpochMillis(millis) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(*millis) * 1_000_000)
                .map_err(|_| EventDateError::OutOfRange { millis: *millis })
        }
        RawDate::Text(text) => parse_date_text(text.trim()),
    }
}

fn parse_date_text(input: &str) -> Result<OffsetDateTime, EventDateError> {
    if let Ok(instant) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }

    if let Ok(date) = Date::parse(input, CALENDAR_DATE_FORMAT) {
        return Ok(date.midnight().assume_utc());
    }

    if let Some(instant) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| OffsetDateTime::parse(input, format).ok())
    {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(input, format).ok())
        .map(PrimitiveDateTime::assume_utc)
        .ok_or_else(|| EventDateError::Unrecognized {
            input: input.to_string(),
        })
}

pub fn format_human_date(instant: OffsetDateTime) -> Result<String, EventDateError> {
    Ok(instant.date().format(HUMAN_DATE_FORMAT)?)
}

fn compare_sort(left: Option<&SortKey>, right: Option<&SortKey>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
