//! Integration tests for the weekly match allocator.

use chrono::{NaiveDate, NaiveTime};
use league_calendar_web::{
    generate_round_robin, schedule_matches_with_constraints, AllocationOptions, Fixture,
    LeagueError, ScheduledFixture, UnscheduledReason,
};
use std::collections::HashSet;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2026-10-19 is a Monday, 2026-10-24 a Saturday, 2026-10-25 a Sunday.
const MONDAY: u32 = 19;
const SATURDAY: u32 = 24;

fn options(start: u32, venues: &[&str]) -> AllocationOptions {
    AllocationOptions::new(date(start), venues.iter().copied())
}

#[test]
fn same_day_conflict_moves_to_next_day_skipping_sunday() {
    let fixtures = vec![Fixture::new("U18", "X", "Y"), Fixture::new("U18", "X", "Z")];
    let outcome =
        schedule_matches_with_constraints(&fixtures, &options(SATURDAY, &["Gymnase 1", "Gymnase 2"]), &[])
            .unwrap();

    assert!(outcome.unscheduled.is_empty());
    assert_eq!(outcome.scheduled.len(), 2);
    assert_eq!(outcome.scheduled[0].date, date(SATURDAY));
    assert_eq!(outcome.scheduled[0].time, time(9, 0));
    assert_eq!(outcome.scheduled[0].venue, "Gymnase 1");
    assert_eq!(outcome.scheduled[1].date, date(26));
    assert_eq!(outcome.scheduled[1].time, time(9, 0));
    assert_eq!(outcome.scheduled[1].venue, "Gymnase 1");
}

#[test]
fn venues_rotate_before_time_advances() {
    let fixtures = vec![
        Fixture::new("U18", "A", "B"),
        Fixture::new("U18", "C", "D"),
        Fixture::new("U18", "E", "F"),
    ];
    let outcome =
        schedule_matches_with_constraints(&fixtures, &options(MONDAY, &["V1", "V2"]), &[]).unwrap();

    let slots: Vec<_> = outcome
        .scheduled
        .iter()
        .map(|s| (s.date, s.time, s.venue.as_str()))
        .collect();
    assert_eq!(
        slots,
        vec![
            (date(MONDAY), time(9, 0), "V1"),
            (date(MONDAY), time(9, 0), "V2"),
            (date(MONDAY), time(10, 30), "V1"),
        ]
    );
}

#[test]
fn day_window_end_moves_to_next_day() {
    let mut opts = options(MONDAY, &["Salle"]);
    opts.daily_end_time = time(10, 0);
    let fixtures = vec![Fixture::new("U15", "A", "B"), Fixture::new("U15", "C", "D")];
    let outcome = schedule_matches_with_constraints(&fixtures, &opts, &[]).unwrap();

    assert_eq!(outcome.scheduled[0].date, date(MONDAY));
    assert_eq!(outcome.scheduled[1].date, date(20));
    assert_eq!(outcome.scheduled[1].time, time(9, 0));
}

#[test]
fn sunday_start_begins_on_monday() {
    let fixtures = vec![Fixture::new("U18", "A", "B")];
    let outcome = schedule_matches_with_constraints(&fixtures, &options(25, &["V"]), &[]).unwrap();
    assert_eq!(outcome.scheduled[0].date, date(26));
}

#[test]
fn categories_are_independent_but_share_venue_slots() {
    let fixtures = vec![Fixture::new("U18", "X", "Y"), Fixture::new("U15", "X", "W")];
    let outcome = schedule_matches_with_constraints(&fixtures, &options(MONDAY, &["V"]), &[]).unwrap();

    assert!(outcome.unscheduled.is_empty());
    // Same team name in two categories may play the same day, but not in the same slot.
    assert_eq!(outcome.scheduled[0].date, date(MONDAY));
    assert_eq!(outcome.scheduled[1].date, date(MONDAY));
    assert_eq!(outcome.scheduled[0].time, time(9, 0));
    assert_eq!(outcome.scheduled[1].time, time(10, 30));
}

#[test]
fn retry_limit_reports_fixture_and_keeps_going() {
    let mut opts = options(MONDAY, &["V1", "V2"]);
    opts.max_day_advances = 0;
    let fixtures = vec![
        Fixture::new("U18", "X", "Y"),
        Fixture::new("U18", "X", "Z"),
        Fixture::new("U18", "A", "B"),
    ];
    let outcome = schedule_matches_with_constraints(&fixtures, &opts, &[]).unwrap();

    assert_eq!(outcome.unscheduled.len(), 1);
    assert_eq!(outcome.unscheduled[0].fixture, fixtures[1]);
    assert_eq!(outcome.unscheduled[0].reason, UnscheduledReason::RetryLimitReached);

    // The failed fixture did not move the cursor: A-B still gets Monday's second venue.
    let ab = &outcome.scheduled[1];
    assert_eq!(ab.fixture, fixtures[2]);
    assert_eq!((ab.date, ab.time, ab.venue.as_str()), (date(MONDAY), time(9, 0), "V2"));
}

#[test]
fn end_date_limits_the_week() {
    let mut opts = options(MONDAY, &["V"]);
    opts.end_date = Some(date(MONDAY));
    let fixtures = vec![Fixture::new("U18", "X", "Y"), Fixture::new("U18", "X", "Z")];
    let outcome = schedule_matches_with_constraints(&fixtures, &opts, &[]).unwrap();

    assert_eq!(outcome.scheduled.len(), 1);
    assert_eq!(outcome.unscheduled[0].reason, UnscheduledReason::PastEndDate);
}

#[test]
fn duplicates_and_existing_bookings_are_reported() {
    let existing = vec![ScheduledFixture {
        fixture: Fixture::new("U18", "X", "Y"),
        date: date(MONDAY),
        time: time(9, 0),
        venue: "V1".into(),
    }];
    let fixtures = vec![
        Fixture::new("U18", "Y", "X"),
        Fixture::new("U18", "A", "B"),
        Fixture::new("U18", "B", "A"),
        Fixture::new("U18", "X", "Z"),
        Fixture::new("U18", "Q", "Q"),
    ];
    let outcome =
        schedule_matches_with_constraints(&fixtures, &options(MONDAY, &["V1", "V2"]), &existing)
            .unwrap();

    let reasons: Vec<_> = outcome
        .unscheduled
        .iter()
        .map(|u| (u.fixture.home_team.as_str(), u.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("Y", UnscheduledReason::AlreadyScheduled),
            ("B", UnscheduledReason::Duplicate),
            ("Q", UnscheduledReason::InvalidFixture),
        ]
    );

    // A-B skips the slot taken by the existing booking.
    assert_eq!(outcome.scheduled[0].fixture.home_team, "A");
    assert_eq!(outcome.scheduled[0].venue, "V2");
    // X already plays Monday in the existing schedule.
    assert_eq!(outcome.scheduled[1].fixture.home_team, "X");
    assert_eq!(outcome.scheduled[1].date, date(20));
}

#[test]
fn full_round_robin_has_no_conflicts_and_loses_nothing() {
    let teams: Vec<String> = (1..=6).map(|i| format!("Equipe {i}")).collect();
    let mut fixtures: Vec<Fixture> = generate_round_robin(&teams)
        .iter()
        .flat_map(|r| r.matches.iter())
        .map(|m| Fixture::new("U18", m.home_team.clone(), m.away_team.clone()))
        .collect();
    fixtures.extend(
        generate_round_robin(&teams)
            .iter()
            .flat_map(|r| r.matches.iter())
            .map(|m| Fixture::new("U15", m.home_team.clone(), m.away_team.clone())),
    );

    let outcome =
        schedule_matches_with_constraints(&fixtures, &options(SATURDAY, &["V1", "V2"]), &[]).unwrap();
    assert_eq!(outcome.scheduled.len() + outcome.unscheduled.len(), fixtures.len());
    assert!(outcome.unscheduled.is_empty());

    let mut team_days = HashSet::new();
    let mut slots = HashSet::new();
    for s in &outcome.scheduled {
        assert_ne!(s.date.format("%a").to_string(), "Sun");
        assert!(slots.insert((s.date, s.time, s.venue.clone())), "slot used twice");
        for team in [&s.fixture.home_team, &s.fixture.away_team] {
            assert!(
                team_days.insert((s.fixture.category.clone(), team.clone(), s.date)),
                "{team} plays twice on {}",
                s.date
            );
        }
    }

    let sorted = outcome
        .scheduled
        .windows(2)
        .all(|w| (w[0].date, w[0].time) <= (w[1].date, w[1].time));
    assert!(sorted);
}

#[test]
fn same_input_same_schedule() {
    let fixtures = vec![
        Fixture::new("U18", "A", "B"),
        Fixture::new("U18", "A", "C"),
        Fixture::new("U18", "B", "C"),
    ];
    let opts = options(MONDAY, &["V1"]);
    assert_eq!(
        schedule_matches_with_constraints(&fixtures, &opts, &[]).unwrap(),
        schedule_matches_with_constraints(&fixtures, &opts, &[]).unwrap()
    );
}

#[test]
fn invalid_options_are_rejected() {
    let fixtures = vec![Fixture::new("U18", "A", "B")];

    let no_venue = options(MONDAY, &[]);
    assert!(matches!(
        schedule_matches_with_constraints(&fixtures, &no_venue, &[]),
        Err(LeagueError::InvalidSchedulingOptions(_))
    ));

    let mut zero_interval = options(MONDAY, &["V"]);
    zero_interval.match_interval = 0;
    assert!(schedule_matches_with_constraints(&fixtures, &zero_interval, &[]).is_err());

    let mut inverted = options(MONDAY, &["V"]);
    inverted.daily_end_time = time(8, 0);
    assert!(schedule_matches_with_constraints(&fixtures, &inverted, &[]).is_err());
}
