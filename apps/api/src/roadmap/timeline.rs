//! Timeline View: the time-ordered projection of a sequential roadmap.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::roadmap::diagram::MISSING_PLACEHOLDER;
use crate::roadmap::models::{FieldValue, Roadmap};

/// One entry for the client's timeline renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Returns `None` for branching roadmaps, which have no meaningful time axis.
/// Items are ordered by start date; undated steps follow in input order.
pub fn build_timeline(roadmap: &Roadmap) -> Option<Vec<TimelineItem>> {
    let steps = match roadmap {
        Roadmap::Empty => return Some(Vec::new()),
        Roadmap::Branching(_) => return None,
        Roadmap::Sequential(steps) => steps,
    };

    let mut items: Vec<TimelineItem> = steps
        .iter()
        .map(|step| TimelineItem {
            id: step
                .step_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
            title: step
                .title
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
            description: step.description.as_ref().map(|d| d.to_string()),
            start: step.start_date.as_ref().and_then(parse_date),
            end: step.end_date.as_ref().and_then(parse_date),
        })
        .collect();

    // Stable sort keeps input order among equal or missing start dates.
    items.sort_by_key(|item| (item.start.is_none(), item.start));
    Some(items)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. Anything else leaves the step undated.
fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()));
    if parsed.is_none() {
        warn!("Unrecognized roadmap date '{value}'; step left undated");
    }
    parsed
}
