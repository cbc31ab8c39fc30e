//! Standalone match records (materialised from weekly schedules) and their status lifecycle.

use crate::models::schedule::{ScheduleId, ScheduledFixture};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match record.
pub type MatchId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    /// Finished and Cancelled are terminal.
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Postponed)
                | (Scheduled, Cancelled)
                | (InProgress, Finished)
                | (InProgress, Cancelled)
                | (Postponed, Scheduled)
                | (Postponed, Cancelled)
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueMatch {
    pub id: MatchId,
    pub category: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub status: MatchStatus,
    /// Weekly schedule this match was materialised from.
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
}

impl LeagueMatch {
    pub fn new(
        category: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            date: None,
            time: None,
            venue: None,
            home_score: None,
            away_score: None,
            status: MatchStatus::Scheduled,
            schedule_id: None,
        }
    }

    pub fn from_scheduled(scheduled: &ScheduledFixture, schedule_id: ScheduleId) -> Self {
        let f = &scheduled.fixture;
        Self {
            date: Some(scheduled.date),
            time: Some(scheduled.time),
            venue: Some(scheduled.venue.clone()),
            schedule_id: Some(schedule_id),
            ..Self::new(f.category.clone(), f.home_team.clone(), f.away_team.clone())
        }
    }

    pub fn has_score(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}
