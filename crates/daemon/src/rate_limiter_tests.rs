use super::*;

const CALLER: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1));
const OTHER: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 2));

#[test]
fn allows_requests_up_to_capacity() {
    let limiter = RateLimiter::new(3);
    assert!(limiter.check(CALLER).allowed);
    assert!(limiter.check(CALLER).allowed);
    assert!(limiter.check(CALLER).allowed);
    assert!(!limiter.check(CALLER).allowed);
}

#[test]
fn exhausted_bucket_reports_rate_limit_headers() {
    let limiter = RateLimiter::new(1);
    assert!(limiter.check(CALLER).allowed);
    let decision = limiter.check(CALLER);
    assert!(!decision.allowed);
    assert_eq!(decision.limit, 1);
    assert_eq!(decision.remaining, 0);
    assert_eq!(decision.retry_after_secs, 1);
}

#[test]
fn refills_over_time() {
    let limiter = RateLimiter::new(1000);
    for _ in 0..1000 {
        assert!(limiter.check(CALLER).allowed);
    }
    assert!(!limiter.check(CALLER).allowed);
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(limiter.check(CALLER).allowed);
}

#[test]
fn each_remote_gets_its_own_bucket() {
    let limiter = RateLimiter::new(1);
    assert!(limiter.check(CALLER).allowed);
    assert!(!limiter.check(CALLER).allowed);
    // A different remote is unaffected by CALLER's exhausted bucket.
    assert!(limiter.check(OTHER).allowed);
}
