use std::sync::Arc;
use std::thread;

use harvest_core::{Admission, DedupLedger};

#[test]
fn admit_returns_true_once_per_id() {
    let ledger = DedupLedger::new();
    let admitted = (0..5).filter(|_| ledger.admit("media-1")).count();

    assert_eq!(admitted, 1);
    assert_eq!(ledger.len(), 1);
    assert!(ledger.contains("media-1"));
}

#[test]
fn cap_blocks_new_ids_but_still_reports_duplicates() {
    let ledger = DedupLedger::new();
    assert_eq!(ledger.admit_within("a", Some(2)), Admission::Admitted);
    assert_eq!(ledger.admit_within("b", Some(2)), Admission::Admitted);
    assert_eq!(ledger.admit_within("c", Some(2)), Admission::CapReached);
    assert_eq!(ledger.admit_within("a", Some(2)), Admission::Duplicate);
    assert_eq!(ledger.admit_within("c", None), Admission::Admitted);
    assert_eq!(ledger.len(), 3);
}

#[test]
fn concurrent_admits_never_double_count() {
    let ledger = Arc::new(DedupLedger::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                (0..200)
                    .filter(|i| ledger.admit(&format!("id-{}", i % 50)))
                    .count()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 50);
    assert_eq!(ledger.len(), 50);
}

#[test]
fn concurrent_capped_admits_stop_exactly_at_cap() {
    let ledger = Arc::new(DedupLedger::new());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                (0..100)
                    .filter(|i| {
                        ledger.admit_within(&format!("{t}-{i}"), Some(30)) == Admission::Admitted
                    })
                    .count()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 30);
    assert_eq!(ledger.len(), 30);
}
