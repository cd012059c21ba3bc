//! Report CLI: table vs JSON rendering, empty-state messages.

use crate::prelude::*;

#[test]
fn sessions_listing_is_empty_before_any_hook_fires() {
    let daemon = Daemon::start();

    let text = daemon.report().args(["sessions"]).output().expect("run");
    text.ok();
    assert!(text.stdout_string().contains("no sessions found"));
}

#[test]
fn work_days_listing_is_empty_before_any_hook_fires() {
    let daemon = Daemon::start();

    let text = daemon.report().args(["work-days"]).output().expect("run");
    text.ok();
    assert!(text.stdout_string().contains("no work days found"));
}

#[test]
fn json_output_is_valid_json_for_every_subcommand() {
    let daemon = Daemon::start();
    daemon.hook().args(["--type", "start"]).output().expect("run").ok();

    for args in [vec!["status"], vec!["sessions"], vec!["work-blocks"], vec!["work-days"]] {
        let mut full_args = args.clone();
        full_args.push("-o");
        full_args.push("json");
        let output = daemon.report().args(&full_args).output().expect("run");
        output.ok();
        let parsed: Result<serde_json::Value, _> = serde_json::from_slice(&output.stdout);
        assert!(parsed.is_ok(), "subcommand {args:?} did not print valid json: {}", output.stdout_string());
    }
}

#[test]
fn metrics_endpoint_is_reachable_through_the_admin_surface() {
    let daemon = Daemon::start();
    let (status, _body) = http_get(&daemon.url, "/api/v1/metrics");
    assert_eq!(status, 200);
}
