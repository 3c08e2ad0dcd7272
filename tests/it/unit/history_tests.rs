//! Unit tests for the undo/redo history.

use printfit::history::History;
use printfit::types::ArtworkTransform;

fn at(x: f64) -> ArtworkTransform {
    ArtworkTransform::new(x, 10.0, 0.5, 0.0)
}

#[test]
fn test_undo_n_then_redo_n_restores_final_state() {
    for n in 1..12 {
        let mut history = History::new(50);
        history.record(at(0.0));
        for i in 1..=n {
            history.record(at(i as f64));
        }
        let last = history.current();

        for _ in 0..n {
            assert!(history.undo().is_some());
        }
        assert_eq!(history.current(), Some(at(0.0)));
        // Extra undos stop at the oldest entry
        assert_eq!(history.undo(), None);
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(at(0.0)));

        for _ in 0..n {
            assert!(history.redo().is_some());
        }
        assert_eq!(history.current(), last);
        assert_eq!(history.redo(), None);
    }
}

#[test]
fn test_record_after_undo_discards_redo_branch() {
    let mut history = History::new(10);
    history.record(at(1.0));
    history.record(at(2.0));
    history.record(at(3.0));

    assert_eq!(history.undo(), Some(at(2.0)));
    history.record(at(9.0));

    assert!(!history.can_redo());
    assert_eq!(history.len(), 3);
    assert_eq!(history.undo(), Some(at(2.0)));
    assert_eq!(history.redo(), Some(at(9.0)));
}

#[test]
fn test_capacity_drops_oldest() {
    let mut history = History::new(3);
    for i in 0..5 {
        history.record(at(i as f64));
    }
    assert_eq!(history.len(), 3);
    assert_eq!(history.step(), 2);
    let kept: Vec<f64> = history.iter().map(|e| e.transform.x).collect();
    assert_eq!(kept, vec![2.0, 3.0, 4.0]);

    assert_eq!(history.undo(), Some(at(3.0)));
    assert_eq!(history.undo(), Some(at(2.0)));
    assert_eq!(history.undo(), None);
}

#[test]
fn test_zero_capacity_keeps_one_entry() {
    let mut history = History::new(0);
    history.record(at(1.0));
    history.record(at(2.0));
    assert_eq!(history.capacity(), 1);
    assert_eq!(history.len(), 1);
    assert_eq!(history.current(), Some(at(2.0)));
}

#[test]
fn test_entries_are_timestamped_in_order() {
    let mut history = History::default();
    history.record(at(1.0));
    history.record(at(2.0));
    let stamps: Vec<_> = history.iter().map(|e| e.timestamp).collect();
    assert!(stamps[0] <= stamps[1]);
    assert_eq!(history.current_entry().map(|e| e.transform), Some(at(2.0)));
}

#[test]
fn test_clear_resets_cursor() {
    let mut history = History::new(5);
    history.record(at(1.0));
    history.record(at(2.0));
    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.current(), None);
    history.record(at(3.0));
    assert_eq!(history.step(), 0);
}
