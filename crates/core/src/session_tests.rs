use super::*;

#[test]
fn start_fixes_end_time_five_hours_later() {
    let s = Session::start(SessionId::new("s1"), 1_000);
    assert_eq!(s.start_time, 1_000);
    assert_eq!(s.end_time, 1_000 + SESSION_WINDOW_SECS);
    assert!(s.is_active);
}

#[test]
fn covers_includes_end_time_boundary() {
    let s = Session::start(SessionId::new("s1"), 0);
    assert!(s.covers(s.end_time));
    assert!(!s.covers(s.end_time + 1));
    assert!(s.covers(s.start_time));
}

#[test]
fn finalize_clears_is_active() {
    let mut s = Session::start(SessionId::new("s1"), 0);
    s.finalize();
    assert!(!s.is_active);
    // end_time is immutable even after finalize
    assert_eq!(s.end_time, SESSION_WINDOW_SECS);
}

// =============================================================================
// Property-Based Tests
// =============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn window_is_always_fixed_at_five_hours(start in i64::MIN / 2..i64::MAX / 2) {
            let s = Session::start(SessionId::new("s1"), start);
            prop_assert_eq!(s.end_time - s.start_time, SESSION_WINDOW_SECS);
        }

        #[test]
        fn covers_matches_the_closed_interval(start in 0i64..1_000_000, offset in -10i64..SESSION_WINDOW_SECS + 10) {
            let s = Session::start(SessionId::new("s1"), start);
            let ts = start + offset;
            prop_assert_eq!(s.covers(ts), ts >= s.start_time && ts <= s.end_time);
        }

        #[test]
        fn a_session_started_after_the_previous_ones_end_never_overlaps(start in 0i64..1_000_000, gap in 1i64..1_000) {
            let first = Session::start(SessionId::new("s1"), start);
            let second = Session::start(SessionId::new("s2"), first.end_time + gap);
            prop_assert!(second.start_time > first.end_time);
        }
    }
}
