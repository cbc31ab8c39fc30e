//! Integration tests for the league store: rosters, saved calendars, weekly schedules, matches.

use chrono::{NaiveDate, NaiveTime};
use league_calendar_web::{
    calendar_standings, compute_standings, schedule_to_csv, AllocationOptions, AllocationOutcome,
    AppConfig, Calendar, CalendarMatch, CalendarStructure, Fixture, Forfeit, League, LeagueError,
    LeagueMatch, MatchResult, MatchStatus, Round, ScheduledFixture, MAX_SCORE,
};
use std::collections::HashMap;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn league_with_teams(category: &str, teams: &[&str]) -> League {
    let mut league = League::new();
    league.add_category(category, Vec::new()).unwrap();
    for team in teams {
        league.add_team(team, category, None).unwrap();
    }
    league
}

/// League with one saved poolless calendar for the given teams.
fn league_with_calendar(teams: &[&str]) -> (League, uuid::Uuid) {
    let mut league = league_with_teams("U18", teams);
    let generation = league.generate_calendars(None, None).unwrap();
    let calendar = generation.calendars.into_iter().next().unwrap();
    let id = league.save_calendar(calendar).unwrap().id;
    (league, id)
}

#[test]
fn roster_validation() {
    let mut league = League::new();
    league.add_category("U18 FILLES", vec!["A".into(), "B".into()]).unwrap();
    assert_eq!(
        league.add_category("u18 filles", Vec::new()).unwrap_err(),
        LeagueError::DuplicateCategory
    );

    league.add_team("Aigles", "U18 FILLES", Some("A")).unwrap();
    assert_eq!(
        league.add_team("aigles", "U18 FILLES", Some("B")).unwrap_err(),
        LeagueError::DuplicateTeam
    );
    assert!(matches!(
        league.add_team("Bisons", "U18 FILLES", None),
        Err(LeagueError::UnknownPool { .. })
    ));
    assert!(matches!(
        league.add_team("Bisons", "SENIORS", None),
        Err(LeagueError::CategoryNotFound(_))
    ));
    assert_eq!(league.add_team("   ", "U18 FILLES", Some("A")).unwrap_err(), LeagueError::EmptyName);

    let category_id = league.categories[0].id;
    assert!(matches!(
        league.remove_category(category_id),
        Err(LeagueError::CategoryInUse(_))
    ));

    let team_id = league.teams[0].id;
    let moved = league.update_team(team_id, "Aigles", "U18 FILLES", Some("B")).unwrap();
    assert_eq!(moved.pool.as_deref(), Some("B"));
}

#[test]
fn csv_import_is_all_or_nothing() {
    let mut league = League::new();
    league.add_category("U15", vec!["A".into(), "B".into()]).unwrap();

    let csv = "name,category,pool\nLions, U15 ,A\nLoups,U15,B\n";
    assert_eq!(league.import_teams_csv(csv.as_bytes()).unwrap(), 2);
    assert_eq!(league.teams[0].category, "U15");
    assert_eq!(league.teams[1].pool.as_deref(), Some("B"));

    let bad = "name,category,pool\nLynx,U15,A\nOurs,U15,Z\n";
    assert!(league.import_teams_csv(bad.as_bytes()).is_err());
    assert_eq!(league.teams.len(), 2);
}

#[test]
fn saved_calendars_are_versioned() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C"]);
    let saved = league.calendar(id).unwrap().clone();
    assert_eq!(saved.version, 1);

    // One calendar per category.
    let again = league.generate_calendars(None, None).unwrap().calendars.remove(0);
    assert_eq!(
        league.save_calendar(again).unwrap_err(),
        LeagueError::DuplicateCalendar("U18".into())
    );

    let edited = league.replace_calendar(id, saved.clone(), Some(1)).unwrap();
    assert_eq!(edited.version, 2);
    assert_eq!(
        league.replace_calendar(id, saved, Some(1)).unwrap_err(),
        LeagueError::VersionConflict {
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn exempt_change_bumps_version_only_when_something_changes() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C"]);

    let (calendar, warnings) = league.reassign_exempt(id, Some(1), 0, 0, "C").unwrap();
    assert!(warnings.is_empty());
    assert_eq!(calendar.version, 1);

    let (calendar, _) = league.reassign_exempt(id, Some(1), 0, 0, "A").unwrap();
    assert_eq!(calendar.version, 2);
    let exempts: Vec<_> = calendar
        .structure
        .rounds(0)
        .unwrap()
        .iter()
        .map(|r| r.exempt.clone().unwrap())
        .collect();
    assert_eq!(exempts, vec!["A", "B", "C"]);

    assert!(matches!(
        league.reassign_exempt(id, Some(1), 0, 1, "C"),
        Err(LeagueError::VersionConflict { .. })
    ));
}

#[test]
fn standings_follow_recorded_results() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C"]);
    // Rounds: A-B (C exempt), C-A (B exempt), B-C (A exempt).
    league
        .record_calendar_result(id, None, 0, 0, 0, MatchResult::Score { home: 80, away: 70 })
        .unwrap();
    league
        .record_calendar_result(id, None, 0, 1, 0, MatchResult::Forfeit { side: Forfeit::Home })
        .unwrap();
    league
        .record_calendar_result(id, None, 0, 2, 0, MatchResult::Score { home: 65, away: 60 })
        .unwrap();
    assert_eq!(
        league
            .record_calendar_result(id, None, 0, 2, 0, MatchResult::Score { home: 60, away: 60 })
            .unwrap_err(),
        LeagueError::TiedScore
    );

    let standings = calendar_standings(league.calendar(id).unwrap());
    assert_eq!(standings.len(), 1);
    let rows = &standings[0].rows;
    let order: Vec<_> = rows.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);

    assert_eq!(rows[0].ranking_points, 4);
    assert_eq!((rows[0].points_for, rows[0].points_against), (100, 70));
    assert_eq!(rows[1].ranking_points, 3);
    assert_eq!(rows[1].point_diff, -5);
    assert_eq!(rows[2].ranking_points, 1);
    assert_eq!(rows[2].forfeits, 1);
}

#[test]
fn playoff_rounds_are_validated() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C"]);
    let calendar = league
        .add_playoff_round(id, None, "Finale", vec![CalendarMatch::new("A", "B")])
        .unwrap();
    assert_eq!(calendar.playoffs.len(), 1);
    assert_eq!(calendar.playoffs[0].name, "Finale");

    assert_eq!(
        league
            .add_playoff_round(id, None, "Demi", vec![CalendarMatch::new("A", "Z")])
            .unwrap_err(),
        LeagueError::TeamNotInPool("Z".into())
    );
    assert_eq!(
        league
            .add_playoff_round(id, None, "Demi", vec![CalendarMatch::new("A", "A")])
            .unwrap_err(),
        LeagueError::SelfMatch("A".into())
    );
}

#[test]
fn weekly_schedule_plan_save_and_materialize() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C", "D"]);
    let options = AllocationOptions::new(monday(), ["Gymnase"]);

    let outcome = league.plan_weekly_schedule(&[id], Some(1), &options).unwrap();
    assert_eq!(outcome.scheduled.len(), 2);
    assert!(outcome.scheduled.iter().all(|s| s.fixture.journee == Some(1)));
    assert!(outcome.scheduled.iter().all(|s| s.fixture.calendar_id == Some(id)));

    let schedule_id = league.create_schedule("Semaine 43", &options, outcome).unwrap().id;

    // Fixtures of journée 1 are booked now.
    let replanned = league.plan_weekly_schedule(&[id], Some(1), &options).unwrap();
    assert!(replanned.scheduled.is_empty());
    assert!(replanned.unscheduled.is_empty());

    let csv = schedule_to_csv(league.schedule(schedule_id).unwrap()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,time,venue,category,pool,journee,home,away"));
    assert_eq!(lines.next(), Some("2026-10-19,09:00,Gymnase,U18,,1,A,D"));

    let ids = league.materialize_schedule(schedule_id).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(league.matches.len(), 2);
    assert!(league.matches.iter().all(|m| m.schedule_id == Some(schedule_id)));
    assert_eq!(
        league.materialize_schedule(schedule_id).unwrap_err(),
        LeagueError::AlreadyMaterialized
    );
}

#[test]
fn match_status_transitions() {
    let mut league = league_with_teams("U18", &["A", "B"]);
    let id = league.add_match(LeagueMatch::new("U18", "A", "B")).unwrap().id;

    assert!(matches!(
        league.set_match_status(id, MatchStatus::Finished),
        Err(LeagueError::InvalidStatusTransition { .. })
    ));
    league.set_match_status(id, MatchStatus::InProgress).unwrap();
    assert_eq!(
        league.set_match_status(id, MatchStatus::Finished).unwrap_err(),
        LeagueError::MissingScore
    );

    let mut update = LeagueMatch::new("U18", "A", "B");
    update.home_score = Some(55);
    update.away_score = Some(49);
    let updated = league.update_match(id, update).unwrap();
    assert_eq!(updated.status, MatchStatus::InProgress);

    league.set_match_status(id, MatchStatus::Finished).unwrap();
    assert!(league.set_match_status(id, MatchStatus::Scheduled).is_err());

    assert!(matches!(
        league.add_match(LeagueMatch::new("U18", "A", "A")),
        Err(LeagueError::SelfMatch(_))
    ));
    league.delete_match(id).unwrap();
    assert!(league.matches.is_empty());
}

#[test]
fn config_defaults_and_overrides() {
    let config = AppConfig::from_lookup(|_| None);
    assert!(!config.cookie_secure);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert!(config.admin_token.is_none());
    assert!(config.session_key.is_none());

    let env: HashMap<&str, String> = HashMap::from([
        ("PORT", "9000".to_string()),
        ("ADMIN_TOKEN", "secret".to_string()),
        ("SESSION_KEY", "short".to_string()),
        ("COOKIE_SECURE", "true".to_string()),
    ]);
    let config = AppConfig::from_lookup(|key| env.get(key).cloned());
    assert!(config.cookie_secure);
    assert_eq!(config.port, 9000);
    assert_eq!(config.admin_token.as_deref(), Some("secret"));
    assert!(config.session_key.is_none());
}

#[test]
fn pool_labels_are_unique_per_category() {
    let mut league = League::new();
    assert_eq!(
        league
            .add_category("U18", vec!["A".into(), "B".into(), "a ".into()])
            .unwrap_err(),
        LeagueError::DuplicatePool("a".into())
    );
    assert!(league.categories.is_empty());

    league.add_category("U18", vec!["A".into(), "B".into()]).unwrap();
    for team in ["X", "Y", "Z"] {
        league.add_team(team, "U18", Some("A")).unwrap();
    }
    let generation = league.generate_calendars(None, None).unwrap();
    let structure = &generation.calendars[0].structure;
    assert_eq!(structure.pool_count(), 2);
    assert_eq!(structure.all_teams(), vec!["X", "Y", "Z"]);
}

fn slot(f: Fixture, date: NaiveDate, hour: u32, venue: &str) -> ScheduledFixture {
    ScheduledFixture {
        fixture: f,
        date,
        time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        venue: venue.to_string(),
    }
}

#[test]
fn manual_schedule_edits_keep_bookings_consistent() {
    let mut league = league_with_teams("U18", &["W", "X", "Y", "Z"]);
    let options = AllocationOptions::new(monday(), ["V1", "V2"]);
    let id = league
        .create_schedule("Semaine 43", &options, AllocationOutcome::default())
        .unwrap()
        .id;
    let tuesday = monday().succ_opt().unwrap();
    let xy = Fixture::new("U18", "X", "Y");

    // Same pair twice, even on different slots.
    let twice = vec![slot(xy.clone(), monday(), 9, "V1"), slot(xy.clone(), tuesday, 9, "V1")];
    assert!(matches!(
        league.update_schedule_fixtures(id, twice).unwrap_err(),
        LeagueError::ScheduleConflict(_)
    ));

    // Two fixtures on one (date, venue, time).
    let same_slot = vec![
        slot(xy.clone(), monday(), 9, "V1"),
        slot(Fixture::new("U18", "W", "Z"), monday(), 9, "V1"),
    ];
    assert!(matches!(
        league.update_schedule_fixtures(id, same_slot).unwrap_err(),
        LeagueError::ScheduleConflict(_)
    ));

    // X plays twice on Monday.
    let same_day = vec![
        slot(xy.clone(), monday(), 9, "V1"),
        slot(Fixture::new("U18", "X", "Z"), monday(), 11, "V2"),
    ];
    assert!(matches!(
        league.update_schedule_fixtures(id, same_day).unwrap_err(),
        LeagueError::ScheduleConflict(_)
    ));

    // Same pair and slot in another category is fine.
    league.add_category("U15", Vec::new()).unwrap();
    let valid = vec![
        slot(Fixture::new("U18", "X", "Z"), tuesday, 9, "V1"),
        slot(xy.clone(), monday(), 9, "V1"),
        slot(Fixture::new("U15", "X", "Y"), monday(), 9, "V2"),
    ];
    let schedule = league.update_schedule_fixtures(id, valid).unwrap();
    assert_eq!(schedule.fixtures.len(), 3);
    assert_eq!(schedule.fixtures[2].date, tuesday);

    // A second schedule cannot take a booked slot or pair.
    let other = league
        .create_schedule("Semaine 44", &options, AllocationOutcome::default())
        .unwrap()
        .id;
    let taken_slot = vec![slot(Fixture::new("U18", "W", "Y"), monday(), 9, "V1")];
    assert!(matches!(
        league.update_schedule_fixtures(other, taken_slot).unwrap_err(),
        LeagueError::ScheduleConflict(_)
    ));
    let taken_pair = vec![slot(Fixture::new("U18", "Y", "X"), tuesday, 14, "V2")];
    assert!(matches!(
        league.update_schedule_fixtures(other, taken_pair).unwrap_err(),
        LeagueError::ScheduleConflict(_)
    ));
    assert!(league.schedule(other).unwrap().fixtures.is_empty());
}

fn single_calendar(teams: &[&str], rounds: Vec<Round>) -> Calendar {
    Calendar::new(
        "U18",
        CalendarStructure::Single {
            teams: teams.iter().map(|t| t.to_string()).collect(),
            rounds,
        },
    )
}

fn round(n: u32, matches: &[(&str, &str)], exempt: Option<&str>) -> Round {
    Round {
        n,
        matches: matches.iter().map(|(h, a)| CalendarMatch::new(*h, *a)).collect(),
        exempt: exempt.map(str::to_string),
    }
}

#[test]
fn submitted_calendars_are_checked_before_storing() {
    let mut league = league_with_teams("U18", &["X", "Y", "Z"]);
    let teams = ["X", "Y", "Z"];

    let self_match = single_calendar(&teams, vec![round(1, &[("X", "X")], Some("Y"))]);
    assert_eq!(
        league.save_calendar(self_match).unwrap_err(),
        LeagueError::SelfMatch("X".into())
    );

    let misnumbered = single_calendar(&teams, vec![round(5, &[("X", "Y")], Some("Z"))]);
    assert_eq!(
        league.save_calendar(misnumbered).unwrap_err(),
        LeagueError::InvalidRoundNumber { expected: 1, found: 5 }
    );

    let outsider = single_calendar(&teams, vec![round(1, &[("X", "Q")], Some("Z"))]);
    assert_eq!(
        league.save_calendar(outsider).unwrap_err(),
        LeagueError::TeamNotInPool("Q".into())
    );

    let repeated = single_calendar(
        &teams,
        vec![round(1, &[("X", "Y")], Some("Z")), round(2, &[("Y", "X")], Some("Z"))],
    );
    assert!(matches!(
        league.save_calendar(repeated).unwrap_err(),
        LeagueError::RepeatedPairing { .. }
    ));

    let exempt_plays = single_calendar(&teams, vec![round(1, &[("X", "Y")], Some("X"))]);
    assert_eq!(
        league.save_calendar(exempt_plays).unwrap_err(),
        LeagueError::ExemptPlaying("X".into())
    );
    assert!(league.calendars.is_empty());

    let generated = league.generate_calendars(None, None).unwrap().calendars.remove(0);
    let id = league.save_calendar(generated).unwrap().id;
    let mut corrupt = league.calendar(id).unwrap().clone();
    if let CalendarStructure::Single { rounds, .. } = &mut corrupt.structure {
        rounds[0].n = 7;
    }
    assert!(matches!(
        league.replace_calendar(id, corrupt, Some(1)).unwrap_err(),
        LeagueError::InvalidRoundNumber { expected: 1, found: 7 }
    ));
    assert_eq!(league.calendar(id).unwrap().version, 1);
}

#[test]
fn scores_are_bounded_and_totals_never_overflow() {
    let (mut league, id) = league_with_calendar(&["A", "B", "C"]);
    let huge = MatchResult::Score {
        home: u32::MAX,
        away: 0,
    };
    assert_eq!(
        league
            .record_calendar_result(id, None, 0, 0, 0, huge)
            .unwrap_err(),
        LeagueError::ScoreOutOfRange(u32::MAX)
    );
    let top = MatchResult::Score {
        home: MAX_SCORE,
        away: 0,
    };
    assert!(league.record_calendar_result(id, None, 0, 0, 0, top).is_ok());

    // Totals saturate even for data that bypassed result entry.
    let mut first = CalendarMatch::new("A", "B");
    first.home_score = Some(u32::MAX);
    first.away_score = Some(1);
    let mut second = CalendarMatch::new("A", "C");
    second.home_score = Some(u32::MAX);
    second.away_score = Some(1);
    let rounds = vec![Round {
        n: 1,
        matches: vec![first, second],
        exempt: None,
    }];
    let teams: Vec<String> = ["A", "B", "C"].iter().map(|t| t.to_string()).collect();
    let table = compute_standings(&teams, &rounds);
    assert_eq!(table[0].team, "A");
    assert_eq!(table[0].points_for, u32::MAX);
}

#[test]
fn public_page_renders_names_as_text() {
    let page = include_str!("../templates/index.html");
    assert!(!page.contains("innerHTML"));
    assert!(page.contains("textContent"));
}
