use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::DealStage;

/// One entry on a team's activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub team_id: Uuid,
    pub kind: TimelineEventKind,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub contract_id: Option<Uuid>,
    #[serde(default)]
    pub pinned: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    ContractCreated,
    StageChanged,
    ContractSigned,
    ContractCompleted,
    Announcement,
}

impl fmt::Display for TimelineEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimelineEventKind::ContractCreated => "contract created",
            TimelineEventKind::StageChanged => "stage changed",
            TimelineEventKind::ContractSigned => "contract signed",
            TimelineEventKind::ContractCompleted => "contract completed",
            TimelineEventKind::Announcement => "announcement",
        };
        write!(f, "{}", label)
    }
}

impl TimelineEvent {
    pub fn contract_created(team_id: Uuid, contract_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            kind: TimelineEventKind::ContractCreated,
            title: "Contract drafted".to_string(),
            body: None,
            contract_id: Some(contract_id),
            pinned: false,
            occurred_at: now,
        }
    }

    pub fn stage_changed(
        team_id: Uuid,
        contract_id: Uuid,
        from: DealStage,
        to: DealStage,
        now: DateTime<Utc>,
    ) -> Self {
        let kind = match to {
            DealStage::Completed => TimelineEventKind::ContractCompleted,
            _ => TimelineEventKind::StageChanged,
        };
        Self {
            id: Uuid::new_v4(),
            team_id,
            kind,
            title: format!("Contract moved from {} to {}", from.label(), to.label()),
            body: None,
            contract_id: Some(contract_id),
            pinned: false,
            occurred_at: now,
        }
    }

    pub fn contract_signed(
        team_id: Uuid,
        contract_id: Uuid,
        party: crate::contract::Party,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            kind: TimelineEventKind::ContractSigned,
            title: format!("Signature recorded for {party}"),
            body: None,
            contract_id: Some(contract_id),
            pinned: false,
            occurred_at: now,
        }
    }

    pub fn season_key(&self) -> String {
        season_key_of(self.occurred_at.date_naive())
    }
}

/// First calendar year of the season containing `date`. Seasons run August
/// through May, so January through July belong to the season that started
/// the previous August.
pub fn season_start_year(date: NaiveDate) -> i32 {
    if date.month() >= 8 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Season label for a date, e.g. 2023-08-01 -> "2023/2024" and
/// 2023-07-31 -> "2022/2023".
pub fn season_key_of(date: NaiveDate) -> String {
    let start = season_start_year(date);
    format!("{}/{}", start, start + 1)
}

/// Timeline display order: pinned entries first regardless of date, then
/// newest first.
pub fn timeline_ordering(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.occurred_at.cmp(&a.occurred_at))
}

pub fn sort_events(events: &mut [TimelineEvent]) {
    events.sort_by(timeline_ordering);
}

/// A season's worth of timeline entries, already in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonGroup {
    pub season: String,
    pub events: Vec<TimelineEvent>,
}

/// Partitions events into seasons, newest season first, each season's
/// events in display order.
pub fn group_by_season(events: Vec<TimelineEvent>) -> Vec<SeasonGroup> {
    let mut buckets: BTreeMap<i32, Vec<TimelineEvent>> = BTreeMap::new();
    for event in events {
        let start = season_start_year(event.occurred_at.date_naive());
        buckets.entry(start).or_default().push(event);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(start, mut events)| {
            sort_events(&mut events);
            SeasonGroup {
                season: format!("{}/{}", start, start + 1),
                events,
            }
        })
        .collect()
}
