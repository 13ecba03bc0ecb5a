//! Snapshot export/restore and file storage.

use chrono::{Duration, TimeZone, Utc};
use workforce_ledger::model::*;
use workforce_ledger::roster::Roster;
use workforce_ledger::storage::{Snapshot, Storage};
use workforce_ledger::{Error, Ledger, ManualClock};

fn busy_ledger() -> (Ledger, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
    let mut ledger = Ledger::with_clock(clock.clone());
    Roster::sample().import_into(&mut ledger).unwrap();

    ledger.clock_in("TRN001", Some("site A")).unwrap();
    clock.advance(Duration::hours(4));
    ledger.clock_out("TRN001", Some("done")).unwrap();
    ledger.clock_in("TRN003", None).unwrap();
    (ledger, clock)
}

#[test]
fn saved_ledger_restores_with_open_sessions_intact() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path().join("workforce.json"));
    let (ledger, clock) = busy_ledger();

    storage.save(&ledger.snapshot()).unwrap();
    let mut restored = Ledger::from_snapshot(storage.load().unwrap(), clock.clone()).unwrap();

    assert_eq!(restored.list_all(), ledger.list_all());
    assert_eq!(restored.all_sessions(), ledger.all_sessions());
    assert_eq!(restored.status_of("TRN003"), ClockStatus::ClockedIn);
    assert!(matches!(
        restored.clock_in("TRN003", None),
        Err(Error::AlreadyClockedIn(_))
    ));

    clock.advance(Duration::minutes(30));
    let closed = restored.clock_out("TRN003", None).unwrap();
    assert_eq!(closed.duration().unwrap().to_string(), "0h 30m");

    // Restored ledgers start a fresh event log.
    assert_eq!(restored.events_since(0).len(), 1);
}

#[test]
fn snapshot_preserves_registration_order_for_ties() {
    let mut ledger = Ledger::new();
    ledger
        .register(NewWorker::new("B", "Sam", "Co", "Kingston"))
        .unwrap();
    ledger
        .register(NewWorker::new("A", "Sam", "Co", "Kingston"))
        .unwrap();

    let restored = Ledger::from_snapshot(ledger.snapshot(), ManualClock::new(Utc::now())).unwrap();
    let ids: Vec<_> = restored.list_all().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["B", "A"]);
}

#[test]
fn snapshot_with_two_open_sessions_is_rejected() {
    let (ledger, clock) = busy_ledger();
    let mut snapshot = ledger.snapshot();

    let mut second = snapshot
        .sessions
        .iter()
        .find(|s| s.is_open())
        .cloned()
        .unwrap();
    second.id = SessionId::new();
    snapshot.sessions.push(second);

    assert!(matches!(
        Ledger::from_snapshot(snapshot, clock),
        Err(Error::CorruptSnapshot(_))
    ));
}

#[test]
fn snapshot_with_orphaned_session_is_rejected() {
    let (ledger, clock) = busy_ledger();
    let mut snapshot = ledger.snapshot();
    snapshot.workers.retain(|w| w.id != "TRN001");

    assert!(matches!(
        Ledger::from_snapshot(snapshot, clock),
        Err(Error::CorruptSnapshot(_))
    ));
}

#[test]
fn snapshot_with_duplicate_worker_is_rejected() {
    let (ledger, clock) = busy_ledger();
    let mut snapshot = ledger.snapshot();
    let dup = snapshot.workers[0].clone();
    snapshot.workers.push(dup);

    assert!(matches!(
        Ledger::from_snapshot(snapshot, clock),
        Err(Error::CorruptSnapshot(_))
    ));
}

#[test]
fn snapshot_with_unknown_version_is_rejected() {
    let snapshot = Snapshot {
        version: 99,
        ..Snapshot::empty()
    };
    assert!(matches!(
        Ledger::from_snapshot(snapshot, ManualClock::new(Utc::now())),
        Err(Error::CorruptSnapshot(_))
    ));
}

#[test]
fn snapshot_json_uses_snake_case_fields() {
    let (ledger, _) = busy_ledger();
    let json = serde_json::to_value(ledger.snapshot()).unwrap();

    let session = &json["sessions"][0];
    assert_eq!(session["worker_id"], "TRN001");
    assert_eq!(session["notes"], "site A | done");
    assert!(session["clock_out"].is_string());
    assert!(json["sessions"][1]["clock_out"].is_null());
}
