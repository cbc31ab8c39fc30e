//! Weekly scheduling: fixtures to place, placed fixtures, allocation options and outcome.

use crate::models::calendar::CalendarId;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a weekly schedule record.
pub type ScheduleId = Uuid;

/// A calendar match waiting for a date, identified by category + team pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub category: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub journee: Option<u32>,
    #[serde(default)]
    pub calendar_id: Option<CalendarId>,
}

impl Fixture {
    pub fn new(
        category: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            pool: None,
            journee: None,
            calendar_id: None,
        }
    }

    /// Identity used to detect double-booking: category plus the unordered team pair.
    pub fn pairing_key(&self) -> (String, String, String) {
        let (a, b) = if self.home_team <= self.away_team {
            (&self.home_team, &self.away_team)
        } else {
            (&self.away_team, &self.home_team)
        };
        (self.category.clone(), a.clone(), b.clone())
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

/// A fixture with its date, time and venue (court/terrain label).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFixture {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: String,
}

/// Why a fixture could not be placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Ran out of day-advances without finding a conflict-free slot.
    RetryLimitReached,
    /// The next usable day is after the requested end date.
    PastEndDate,
    /// Same category and team pair appeared earlier in the input.
    Duplicate,
    /// Same category and team pair is already in an existing schedule.
    AlreadyScheduled,
    /// Home and away team are the same.
    InvalidFixture,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledFixture {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub reason: UnscheduledReason,
}

/// Day, venue and time constraints for the weekly allocator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AllocationOptions {
    pub start_date: NaiveDate,
    /// Last date a fixture may be placed on (inclusive). Unbounded when absent.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Venue/court labels, used in round-robin order.
    pub venues: Vec<String>,
    #[serde(default = "default_daily_start_time")]
    pub daily_start_time: NaiveTime,
    #[serde(default = "default_daily_end_time")]
    pub daily_end_time: NaiveTime,
    /// Minutes between consecutive matches at a venue.
    #[serde(default = "default_match_interval")]
    pub match_interval: u32,
    /// Day-advances allowed per fixture before it is reported unscheduled.
    #[serde(default = "default_max_day_advances")]
    pub max_day_advances: u32,
}

pub fn default_daily_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_daily_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()
}

pub fn default_match_interval() -> u32 {
    90
}

pub fn default_max_day_advances() -> u32 {
    30
}

impl AllocationOptions {
    /// Options with the default day window, interval and retry cap.
    pub fn new<I, S>(start_date: NaiveDate, venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start_date,
            end_date: None,
            venues: venues.into_iter().map(Into::into).collect(),
            daily_start_time: default_daily_start_time(),
            daily_end_time: default_daily_end_time(),
            match_interval: default_match_interval(),
            max_day_advances: default_max_day_advances(),
        }
    }
}

/// Result of one allocation run. Every input fixture lands in exactly one of the two lists.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Sorted by date then time.
    pub scheduled: Vec<ScheduledFixture>,
    pub unscheduled: Vec<UnscheduledFixture>,
}

/// A saved weekly schedule. Materialising it creates standalone match records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: ScheduleId,
    pub name: String,
    pub start_date: NaiveDate,
    pub fixtures: Vec<ScheduledFixture>,
    #[serde(default)]
    pub unscheduled: Vec<UnscheduledFixture>,
    #[serde(default)]
    pub materialized: bool,
    pub created_at: DateTime<Utc>,
}

impl WeeklySchedule {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, outcome: AllocationOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            fixtures: outcome.scheduled,
            unscheduled: outcome.unscheduled,
            materialized: false,
            created_at: Utc::now(),
        }
    }
}
