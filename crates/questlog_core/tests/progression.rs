use questlog_core::db::open_db_in_memory;
use questlog_core::{next_level_xp, ProgressionService, SqliteUserRepository};
use rusqlite::Connection;
use uuid::Uuid;

fn progression(conn: &Connection) -> ProgressionService<SqliteUserRepository<'_>> {
    ProgressionService::new(SqliteUserRepository::new(conn))
}

#[test]
fn ensure_user_creates_once_per_external_id() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);

    let first = service.ensure_user(42, "Alice").unwrap();
    assert_eq!(first.level, 1);
    assert_eq!(first.experience, 0);
    assert_eq!(first.completed_tasks, 0);

    let second = service.ensure_user(42, "Alice again").unwrap();
    assert_eq!(second.uuid, first.uuid);
    assert_eq!(second.display_name, "Alice");

    let other = service.ensure_user(43, "Bob").unwrap();
    assert_ne!(other.uuid, first.uuid);
}

#[test]
fn experience_accumulates_and_levels_up_at_exact_threshold() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let user = service.ensure_user(1, "tester").unwrap();

    let after_partial = service.add_experience(user.uuid, 99).unwrap().unwrap();
    assert_eq!(after_partial.level, 1);
    assert_eq!(after_partial.experience, 99);

    // floor(100 * 1^1.5) = 100: reaching it exactly levels up.
    let after_threshold = service.add_experience(user.uuid, 1).unwrap().unwrap();
    assert_eq!(after_threshold.level, 2);
    assert_eq!(after_threshold.experience, 100);
}

#[test]
fn one_call_never_cascades_multiple_levels() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let user = service.ensure_user(2, "tester").unwrap();

    // 1000 XP clears the level-1 and level-2 thresholds in one grant, but a
    // single call still raises the level exactly once.
    let boosted = service.add_experience(user.uuid, 1000).unwrap().unwrap();
    assert_eq!(boosted.level, 2);
    assert_eq!(boosted.experience, 1000);

    let again = service.add_experience(user.uuid, 1).unwrap().unwrap();
    assert_eq!(again.level, 3);
}

#[test]
fn zero_xp_is_a_valid_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let user = service.ensure_user(3, "tester").unwrap();

    service.add_experience(user.uuid, 1000).unwrap();

    let unchanged = service.add_experience(user.uuid, 0).unwrap().unwrap();
    assert_eq!(unchanged.level, 2);
    assert_eq!(unchanged.experience, 1000);
}

#[test]
fn completed_tasks_counter_increments() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let user = service.ensure_user(4, "tester").unwrap();

    service.increment_completed_tasks(user.uuid).unwrap();
    let counted = service
        .increment_completed_tasks(user.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(counted.completed_tasks, 2);
}

#[test]
fn stats_expose_next_level_threshold() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let user = service.ensure_user(5, "tester").unwrap();

    service.add_experience(user.uuid, 150).unwrap();

    let stats = service.stats(user.uuid).unwrap().unwrap();
    assert_eq!(stats.level, 2);
    assert_eq!(stats.experience, 150);
    assert_eq!(stats.next_level_xp, next_level_xp(2));
    assert_eq!(stats.completed_tasks, 0);
}

#[test]
fn missing_users_read_as_none() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);
    let ghost = Uuid::new_v4();

    assert!(service.stats(ghost).unwrap().is_none());
    assert!(service.add_experience(ghost, 10).unwrap().is_none());
    assert!(service.increment_completed_tasks(ghost).unwrap().is_none());
}

#[test]
fn list_users_returns_all_registrations() {
    let conn = open_db_in_memory().unwrap();
    let service = progression(&conn);

    service.ensure_user(10, "a").unwrap();
    service.ensure_user(11, "b").unwrap();
    service.ensure_user(10, "a-dup").unwrap();

    assert_eq!(service.list_users().unwrap().len(), 2);
}
