use super::*;

#[tokio::test]
async fn replays_queued_snapshots_in_order() {
    let fake = FakeConnScanner::new();
    fake.push(ConnSnapshot { connections: vec![], bytes_delta: 10 });
    fake.push(ConnSnapshot { connections: vec![], bytes_delta: 20 });

    assert_eq!(fake.snapshot(&[1]).await.unwrap().bytes_delta, 10);
    assert_eq!(fake.snapshot(&[1]).await.unwrap().bytes_delta, 20);
}

#[tokio::test]
async fn repeats_last_snapshot_once_queue_is_exhausted() {
    let fake = FakeConnScanner::new();
    fake.push(ConnSnapshot { connections: vec![], bytes_delta: 5 });

    assert_eq!(fake.snapshot(&[1]).await.unwrap().bytes_delta, 5);
    assert_eq!(fake.snapshot(&[1]).await.unwrap().bytes_delta, 5);
}

#[tokio::test]
async fn default_snapshot_before_any_push_is_empty() {
    let fake = FakeConnScanner::new();
    let snap = fake.snapshot(&[1]).await.unwrap();
    assert_eq!(snap.bytes_delta, 0);
}
