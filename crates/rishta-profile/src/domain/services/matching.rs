//! Candidate browsing
//!
//! Client-side filtering and ordering of the match list returned by the backend.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{age_on, UserId};

/// Profile card shown while browsing matches.
///
/// Everything except the id is read leniently: a value of the wrong shape
/// counts as missing instead of failing the whole row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub religion: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub marital_status: Option<String>,
    #[serde(default, alias = "height", deserialize_with = "lenient_height")]
    pub height_cm: Option<u16>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile_photo: Option<String>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub completion: u8,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn lenient_height<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).and_then(|n| u16::try_from(n).ok()))
}

fn lenient_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).map_or(0, |n| u8::try_from(n.min(100)).unwrap_or(100)))
}

/// Non-negative integer from a number or numeric string; fractions are rejected
fn whole_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl CandidateSummary {
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.dob.as_deref().and_then(|dob| age_on(dob, today))
    }
}

/// Optional criteria; an unset criterion matches everyone
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub gender: Option<String>,
    pub religion: Option<String>,
    pub city: Option<String>,
    pub marital_status: Option<String>,
    pub min_height_cm: Option<u16>,
}

impl MatchFilter {
    /// Whether a candidate passes every set criterion.
    ///
    /// A candidate missing the data a criterion needs does not pass it.
    pub fn matches(&self, candidate: &CandidateSummary, today: NaiveDate) -> bool {
        if self.min_age.is_some() || self.max_age.is_some() {
            let Some(age) = candidate.age_on(today) else {
                return false;
            };
            if self.min_age.is_some_and(|min| age < min) || self.max_age.is_some_and(|max| age > max) {
                return false;
            }
        }

        if let Some(min) = self.min_height_cm {
            if candidate.height_cm.map_or(true, |height| height < min) {
                return false;
            }
        }

        same_text(&self.gender, &candidate.gender)
            && same_text(&self.religion, &candidate.religion)
            && same_text(&self.city, &candidate.city)
            && same_text(&self.marital_status, &candidate.marital_status)
    }
}

fn same_text(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match (wanted.as_deref().map(str::trim), actual.as_deref()) {
        (None, _) | (Some(""), _) => true,
        (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual.trim()),
        (Some(_), None) => false,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSort {
    #[default]
    Newest,
    AgeAsc,
    AgeDesc,
    Completion,
}

/// Filter then order candidates; ties keep the backend order
pub fn browse<'a>(
    candidates: &'a [CandidateSummary],
    filter: &MatchFilter,
    sort: MatchSort,
    today: NaiveDate,
) -> Vec<&'a CandidateSummary> {
    let mut selected: Vec<&CandidateSummary> = candidates
        .iter()
        .filter(|candidate| filter.matches(candidate, today))
        .collect();

    selected.sort_by(|a, b| match sort {
        MatchSort::Newest => missing_last(a.created_at, b.created_at, true),
        MatchSort::AgeAsc => missing_last(a.age_on(today), b.age_on(today), false),
        MatchSort::AgeDesc => missing_last(a.age_on(today), b.age_on(today), true),
        MatchSort::Completion => b.completion.cmp(&a.completion),
    });

    selected
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
