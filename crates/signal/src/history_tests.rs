use super::*;

#[test]
fn drops_oldest_once_over_capacity() {
    let mut history = History::new(2);
    history.push(ActivityIndicator::idle(1));
    history.push(ActivityIndicator::idle(2));
    history.push(ActivityIndicator::idle(3));
    let ts: Vec<i64> = history.snapshot().iter().map(|i| i.ts).collect();
    assert_eq!(ts, vec![2, 3]);
}

#[test]
fn last_n_returns_most_recent_oldest_first() {
    let mut history = History::new(12);
    for ts in 1..=5 {
        history.push(ActivityIndicator::idle(ts));
    }
    let ts: Vec<i64> = history.last_n(3).iter().map(|i| i.ts).collect();
    assert_eq!(ts, vec![3, 4, 5]);
}

#[test]
fn last_n_saturates_when_history_is_shorter_than_n() {
    let mut history = History::new(12);
    history.push(ActivityIndicator::idle(1));
    assert_eq!(history.last_n(3).len(), 1);
}

#[test]
fn set_capacity_shrinks_existing_entries() {
    let mut history = History::new(5);
    for ts in 1..=5 {
        history.push(ActivityIndicator::idle(ts));
    }
    history.set_capacity(2);
    let ts: Vec<i64> = history.snapshot().iter().map(|i| i.ts).collect();
    assert_eq!(ts, vec![4, 5]);
}
