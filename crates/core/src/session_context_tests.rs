use super::*;

fn valid_ctx(now: i64) -> SessionContext {
    SessionContext {
        terminal_pid: 1,
        shell_pid: 2,
        working_dir: PathBuf::from("/home/user/project"),
        project_path: PathBuf::from("/home/user/project"),
        user_id: "u1".to_string(),
        timestamp: now,
    }
}

#[test]
fn accepts_well_formed_context() {
    assert!(valid_ctx(1_000).validate(1_000).is_ok());
}

#[test]
fn rejects_relative_working_dir() {
    let mut ctx = valid_ctx(1_000);
    ctx.working_dir = PathBuf::from("relative/path");
    assert_eq!(
        ctx.validate(1_000),
        Err(SessionContextError::WorkingDirNotAbsolute("relative/path".to_string()))
    );
}

#[test]
fn rejects_relative_project_path() {
    let mut ctx = valid_ctx(1_000);
    ctx.project_path = PathBuf::from("relative");
    assert!(matches!(
        ctx.validate(1_000),
        Err(SessionContextError::ProjectPathNotAbsolute(_))
    ));
}

#[test]
fn rejects_empty_user_id() {
    let mut ctx = valid_ctx(1_000);
    ctx.user_id = "   ".to_string();
    assert_eq!(ctx.validate(1_000), Err(SessionContextError::EmptyUserId));
}

#[test]
fn rejects_timestamp_too_far_in_past() {
    let mut ctx = valid_ctx(0);
    ctx.timestamp = 0;
    let now = MAX_PAST_SECS + 1_000;
    assert!(matches!(
        ctx.validate(now),
        Err(SessionContextError::TimestampOutOfRange { .. })
    ));
}

#[test]
fn rejects_timestamp_too_far_in_future() {
    let mut ctx = valid_ctx(0);
    ctx.timestamp = MAX_FUTURE_SECS + 10;
    assert!(matches!(
        ctx.validate(0),
        Err(SessionContextError::TimestampOutOfRange { .. })
    ));
}

#[test]
fn accepts_timestamp_exactly_at_future_boundary() {
    let mut ctx = valid_ctx(0);
    ctx.timestamp = MAX_FUTURE_SECS;
    assert!(ctx.validate(0).is_ok());
}
