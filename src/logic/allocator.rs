//! Weekly match allocation: give fixtures a date, a time slot and a venue.

use crate::models::{
    AllocationOptions, AllocationOutcome, Fixture, LeagueError, ScheduledFixture,
    UnscheduledFixture, UnscheduledReason,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use std::collections::HashSet;

/// Place `fixtures` on dates, venues and time slots.
///
/// Greedy and per category, in input order: each fixture takes the next free (venue, time)
/// slot of the category's current day. When one of its teams already plays that day in the
/// same category, or the day has no free slot left, the category moves to the next day
/// (Sundays skipped) and starts over from the first venue and the day's start time. After
/// `max_day_advances` advances the fixture is reported unscheduled and the category's cursor
/// goes back to where it was.
///
/// Venue slots are shared by every category. Fixtures in `existing` (other weekly schedules)
/// occupy their slots, count for the same-day check and cannot be scheduled again.
///
/// Every input fixture ends up exactly once in `scheduled` (sorted by date, then time) or in
/// `unscheduled`.
pub fn schedule_matches_with_constraints(
    fixtures: &[Fixture],
    options: &AllocationOptions,
    existing: &[ScheduledFixture],
) -> Result<AllocationOutcome, LeagueError> {
    validate_options(options)?;

    let mut board = Board::default();
    for placed in existing {
        board.occupy(placed);
    }
    let already_scheduled: HashSet<_> = existing.iter().map(|s| s.fixture.pairing_key()).collect();
    let mut seen = HashSet::new();

    let mut outcome = AllocationOutcome::default();

    for (category, group) in group_by_category(fixtures) {
        let mut cursor = SlotCursor::start(options);
        log::debug!("Scheduling {} fixture(s) for {}", group.len(), category);

        for fixture in group {
            let rejected = if fixture.home_team == fixture.away_team {
                Some(UnscheduledReason::InvalidFixture)
            } else if already_scheduled.contains(&fixture.pairing_key()) {
                Some(UnscheduledReason::AlreadyScheduled)
            } else if !seen.insert(fixture.pairing_key()) {
                Some(UnscheduledReason::Duplicate)
            } else {
                None
            };
            let placement = match rejected {
                Some(reason) => Err(reason),
                None => place(fixture, options, &mut cursor, &mut board),
            };
            match placement {
                Ok(scheduled) => outcome.scheduled.push(scheduled),
                Err(reason) => {
                    log::warn!(
                        "{}: could not schedule {} vs {} ({:?})",
                        fixture.category,
                        fixture.home_team,
                        fixture.away_team,
                        reason
                    );
                    outcome.unscheduled.push(UnscheduledFixture {
                        fixture: fixture.clone(),
                        reason,
                    });
                }
            }
        }
    }

    outcome.scheduled.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
    Ok(outcome)
}

/// Check hand-edited fixtures against each other and against `existing` bookings with the
/// same rules the allocator follows: no self-match, each pair once per category, one
/// fixture per (date, venue, time) and no team playing twice on a date in its category.
pub(crate) fn check_schedule_conflicts(
    fixtures: &[ScheduledFixture],
    existing: &[ScheduledFixture],
) -> Result<(), LeagueError> {
    let mut board = Board::default();
    let mut pairs = HashSet::new();
    for placed in existing {
        board.occupy(placed);
        pairs.insert(placed.fixture.pairing_key());
    }

    for placed in fixtures {
        let f = &placed.fixture;
        if f.home_team == f.away_team {
            return Err(LeagueError::SelfMatch(f.home_team.clone()));
        }
        if !pairs.insert(f.pairing_key()) {
            return Err(LeagueError::ScheduleConflict(format!(
                "{} vs {} ({}) is scheduled more than once",
                f.home_team, f.away_team, f.category
            )));
        }
        if !board.is_slot_free(placed.date, &placed.venue, placed.time) {
            return Err(LeagueError::ScheduleConflict(format!(
                "{} at {} on {} is already taken",
                placed.venue,
                placed.time.format("%H:%M"),
                placed.date
            )));
        }
        if board.plays_on(f, placed.date) {
            return Err(LeagueError::ScheduleConflict(format!(
                "{} vs {}: a team already plays in {} on {}",
                f.home_team, f.away_team, f.category, placed.date
            )));
        }
        board.occupy(placed);
    }
    Ok(())
}

fn validate_options(options: &AllocationOptions) -> Result<(), LeagueError> {
    if options.venues.is_empty() {
        return Err(LeagueError::InvalidSchedulingOptions(
            "at least one venue is required".into(),
        ));
    }
    if options.match_interval == 0 {
        return Err(LeagueError::InvalidSchedulingOptions(
            "match interval must be positive".into(),
        ));
    }
    if options.daily_end_time < options.daily_start_time {
        return Err(LeagueError::InvalidSchedulingOptions(
            "daily end time is before start time".into(),
        ));
    }
    if options.end_date.is_some_and(|end| end < options.start_date) {
        return Err(LeagueError::InvalidSchedulingOptions(
            "end date is before start date".into(),
        ));
    }
    Ok(())
}

/// Categories in order of first appearance, each with its fixtures in input order.
fn group_by_category(fixtures: &[Fixture]) -> Vec<(&str, Vec<&Fixture>)> {
    let mut groups: Vec<(&str, Vec<&Fixture>)> = Vec::new();
    for fixture in fixtures {
        match groups.iter_mut().find(|(c, _)| *c == fixture.category) {
            Some((_, group)) => group.push(fixture),
            None => groups.push((fixture.category.as_str(), vec![fixture])),
        }
    }
    groups
}

/// Slots taken and (category, team, date) already playing.
#[derive(Default)]
struct Board {
    slots: HashSet<(NaiveDate, String, NaiveTime)>,
    team_days: HashSet<(String, String, NaiveDate)>,
}

impl Board {
    fn occupy(&mut self, placed: &ScheduledFixture) {
        let f = &placed.fixture;
        self.slots
            .insert((placed.date, placed.venue.clone(), placed.time));
        for team in [&f.home_team, &f.away_team] {
            self.team_days
                .insert((f.category.clone(), team.clone(), placed.date));
        }
    }

    fn is_slot_free(&self, date: NaiveDate, venue: &str, time: NaiveTime) -> bool {
        !self.slots.contains(&(date, venue.to_string(), time))
    }

    fn plays_on(&self, fixture: &Fixture, date: NaiveDate) -> bool {
        [&fixture.home_team, &fixture.away_team].into_iter().any(|team| {
            self.team_days
                .contains(&(fixture.category.clone(), team.clone(), date))
        })
    }
}

/// Current day, time slot and venue of one category.
#[derive(Clone, Copy, Debug)]
struct SlotCursor {
    date: NaiveDate,
    time: NaiveTime,
    venue: usize,
}

impl SlotCursor {
    fn start(options: &AllocationOptions) -> Self {
        let date = if options.start_date.weekday() == Weekday::Sun {
            next_playable_day(options.start_date)
        } else {
            options.start_date
        };
        Self {
            date,
            time: options.daily_start_time,
            venue: 0,
        }
    }

    fn next_day(&mut self, options: &AllocationOptions) {
        self.date = next_playable_day(self.date);
        self.time = options.daily_start_time;
        self.venue = 0;
    }

    /// Step to the next venue, then to the next time slot. False once the day is used up.
    fn advance(&mut self, options: &AllocationOptions) -> bool {
        self.venue += 1;
        if self.venue < options.venues.len() {
            return true;
        }
        self.venue = 0;
        match add_minutes(self.time, options.match_interval) {
            Some(next) if next <= options.daily_end_time => {
                self.time = next;
                true
            }
            _ => false,
        }
    }
}

fn place(
    fixture: &Fixture,
    options: &AllocationOptions,
    cursor: &mut SlotCursor,
    board: &mut Board,
) -> Result<ScheduledFixture, UnscheduledReason> {
    let saved = *cursor;
    let mut advances = 0;

    loop {
        if options.end_date.is_some_and(|end| cursor.date > end) {
            *cursor = saved;
            return Err(UnscheduledReason::PastEndDate);
        }

        if !board.plays_on(fixture, cursor.date) {
            let mut day_open = true;
            while !board.is_slot_free(cursor.date, &options.venues[cursor.venue], cursor.time) {
                if !cursor.advance(options) {
                    day_open = false;
                    break;
                }
            }

            if day_open {
                let scheduled = ScheduledFixture {
                    fixture: fixture.clone(),
                    date: cursor.date,
                    time: cursor.time,
                    venue: options.venues[cursor.venue].clone(),
                };
                board.occupy(&scheduled);
                if !cursor.advance(options) {
                    cursor.next_day(options);
                }
                return Ok(scheduled);
            }
        }

        advances += 1;
        if advances > options.max_day_advances {
            *cursor = saved;
            return Err(UnscheduledReason::RetryLimitReached);
        }
        cursor.next_day(options);
    }
}

/// Following day, skipping Sundays.
fn next_playable_day(date: NaiveDate) -> NaiveDate {
    let mut next = date.succ_opt().unwrap_or(date);
    if next.weekday() == Weekday::Sun {
        next = next.succ_opt().unwrap_or(next);
    }
    next
}

fn add_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    (wrapped == 0).then_some(next)
}
