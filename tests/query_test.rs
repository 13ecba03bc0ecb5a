//! Integration tests for search, grouping, hour totals and reports.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use workforce_ledger::model::*;
use workforce_ledger::query::ReportFilter;
use workforce_ledger::roster::Roster;
use workforce_ledger::{Error, Ledger, ManualClock};

fn test_ledger() -> (Ledger, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
    let mut ledger = Ledger::with_clock(clock.clone());
    Roster::sample().import_into(&mut ledger).unwrap();
    (ledger, clock)
}

fn shift(ledger: &mut Ledger, clock: &ManualClock, worker: &str, minutes: i64) -> Session {
    ledger.clock_in(worker, None).unwrap();
    clock.advance(Duration::minutes(minutes));
    ledger.clock_out(worker, None).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn blank_search_equals_list_all() {
    let (ledger, _) = test_ledger();
    assert_eq!(ledger.search(""), ledger.list_all());
    assert_eq!(ledger.search("   "), ledger.list_all());
}

#[test]
fn search_is_case_insensitive_on_every_field() {
    let (ledger, _) = test_ledger();

    let by_location = ledger.search("kingston");
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].id, "TRN001");

    let by_id: Vec<_> = ledger.search("trn00").into_iter().map(|w| w.id).collect();
    assert_eq!(by_id, vec!["TRN003", "TRN001", "TRN002"]);

    assert_eq!(ledger.search("ELITE")[0].name, "Maria Garcia");
    assert_eq!(ledger.search("brow")[0].id, "TRN003");
    assert!(ledger.search("montego").is_empty());
}

#[test]
fn search_results_are_name_sorted() {
    let (ledger, _) = test_ledger();
    let names: Vec<_> = ledger
        .search("construction")
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["David Brown", "John Smith"]);
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[test]
fn group_by_location_keeps_name_order_regardless_of_status() {
    let (mut ledger, _) = test_ledger();
    ledger
        .register(NewWorker::new("TRN004", "Andre Clarke", "Pro Construction", "Portmore"))
        .unwrap();
    ledger.clock_in("TRN004", None).unwrap();

    let groups = ledger.group_by_location();
    assert_eq!(groups.len(), 3);

    let portmore: Vec<_> = groups["Portmore"].iter().map(|w| w.name.as_str()).collect();
    assert_eq!(portmore, vec!["Andre Clarke", "David Brown"]);
    assert_eq!(groups["Kingston"].len(), 1);
    assert_eq!(groups["Spanish Town"][0].id, "TRN002");
}

#[test]
fn group_by_location_matches_exact_value() {
    let (mut ledger, _) = test_ledger();
    ledger
        .register(NewWorker::new("TRN005", "Kay Reid", "ABC Construction", "kingston"))
        .unwrap();

    let groups = ledger.group_by_location();
    assert_eq!(groups["Kingston"].len(), 1);
    assert_eq!(groups["kingston"].len(), 1);
}

// ---------------------------------------------------------------------------
// Hours
// ---------------------------------------------------------------------------

#[test]
fn aggregate_hours_excludes_open_sessions() {
    let (mut ledger, clock) = test_ledger();
    shift(&mut ledger, &clock, "TRN001", 135);
    shift(&mut ledger, &clock, "TRN001", 30);
    ledger.clock_in("TRN001", None).unwrap();
    clock.advance(Duration::hours(3));

    assert!((ledger.aggregate_hours("TRN001", None) - 2.75).abs() < 1e-9);
    assert_eq!(ledger.aggregate_hours("TRN002", None), 0.0);
    assert_eq!(ledger.aggregate_hours("TRN404", None), 0.0);
}

#[test]
fn aggregate_hours_filters_on_clock_in_date() {
    let (mut ledger, clock) = test_ledger();

    // 2025-06-02 07:00, one hour
    shift(&mut ledger, &clock, "TRN001", 60);
    // 2025-06-03 23:30, crosses midnight, two hours
    clock.set(Utc.with_ymd_and_hms(2025, 6, 3, 23, 30, 0).unwrap());
    shift(&mut ledger, &clock, "TRN001", 120);
    // 2025-06-05 08:00, four hours
    clock.set(Utc.with_ymd_and_hms(2025, 6, 5, 8, 0, 0).unwrap());
    shift(&mut ledger, &clock, "TRN001", 240);

    let june3 = DateRange::new(Some(date(2025, 6, 3)), Some(date(2025, 6, 3)));
    assert!((ledger.aggregate_hours("TRN001", Some(june3)) - 2.0).abs() < 1e-9);

    let from_june3 = DateRange::new(Some(date(2025, 6, 3)), None);
    assert!((ledger.aggregate_hours("TRN001", Some(from_june3)) - 6.0).abs() < 1e-9);

    let until_june4 = DateRange::new(None, Some(date(2025, 6, 4)));
    assert!((ledger.aggregate_hours("TRN001", Some(until_june4)) - 3.0).abs() < 1e-9);
}

#[test]
fn hour_totals_use_truncated_minutes() {
    let (mut ledger, clock) = test_ledger();
    ledger.clock_in("TRN002", None).unwrap();
    clock.advance(Duration::seconds(20 * 60 + 59));
    let session = ledger.clock_out("TRN002", None).unwrap();

    assert_eq!(session.duration().unwrap().to_string(), "0h 20m");
    assert!((ledger.aggregate_hours("TRN002", None) - 20.0 / 60.0).abs() < 1e-9);
}

#[test]
fn hour_totals_are_exact_for_uneven_minutes() {
    let lengths = [1, 7, 13, 29, 41, 53, 59, 11, 17, 23];
    let expected = lengths.iter().sum::<i64>() as f64 / 60.0;

    // Fresh ledgers hash their session maps differently each time.
    for _ in 0..50 {
        let (mut ledger, clock) = test_ledger();
        for minutes in lengths {
            shift(&mut ledger, &clock, "TRN001", minutes);
        }

        assert_eq!(ledger.aggregate_hours("TRN001", None), expected);
        let report = ledger.report(&ReportFilter::default()).unwrap();
        assert_eq!(report.total_hours, expected);
    }
}

// ---------------------------------------------------------------------------
// Overview and reports
// ---------------------------------------------------------------------------

#[test]
fn overview_reports_status_and_totals() {
    let (mut ledger, clock) = test_ledger();
    let first = shift(&mut ledger, &clock, "TRN003", 90);
    clock.advance(Duration::hours(12));
    let open = ledger.clock_in("TRN003", Some("night shift")).unwrap();

    let o = ledger.overview("TRN003").unwrap();
    assert_eq!(o.worker.name, "David Brown");
    assert_eq!(o.status, ClockStatus::ClockedIn);
    assert_eq!(o.clocked_in_since, Some(open.clock_in));
    assert_eq!(o.last_clock_out, first.clock_out);
    assert!((o.total_hours - 1.5).abs() < 1e-9);
    assert_eq!(o.completed_sessions, 1);
    assert_eq!(o.active_sessions, 1);

    assert!(matches!(ledger.overview("TRN404"), Err(Error::NotFound(_))));
}

#[test]
fn report_counts_active_sessions_separately() {
    let (mut ledger, clock) = test_ledger();
    shift(&mut ledger, &clock, "TRN001", 135);
    shift(&mut ledger, &clock, "TRN002", 60);
    ledger.clock_in("TRN002", None).unwrap();

    let report = ledger.report(&ReportFilter::default()).unwrap();
    let ids: Vec<_> = report.rows.iter().map(|r| r.worker.id.as_str()).collect();
    assert_eq!(ids, vec!["TRN003", "TRN001", "TRN002"]);

    let maria = &report.rows[2];
    assert_eq!(maria.sessions, 2);
    assert_eq!(maria.completed_sessions, 1);
    assert_eq!(maria.active_sessions, 1);
    assert_eq!(maria.status, ClockStatus::ClockedIn);
    assert!((maria.total_hours - 1.0).abs() < 1e-9);

    assert!((report.total_hours - 3.25).abs() < 1e-9);
    assert_eq!(report.completed_sessions, 2);
    assert_eq!(report.active_sessions, 1);
}

#[test]
fn report_filters_by_worker_and_range() {
    let (mut ledger, clock) = test_ledger();
    shift(&mut ledger, &clock, "TRN001", 60);
    clock.set(Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap());
    shift(&mut ledger, &clock, "TRN001", 120);

    let report = ledger
        .report(&ReportFilter {
            range: DateRange::new(Some(date(2025, 6, 9)), None),
            worker: Some("TRN001".into()),
        })
        .unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].sessions, 1);
    assert!((report.total_hours - 2.0).abs() < 1e-9);

    let missing = ledger.report(&ReportFilter {
        worker: Some("TRN404".into()),
        ..Default::default()
    });
    assert!(matches!(missing, Err(Error::NotFound(_))));
}
