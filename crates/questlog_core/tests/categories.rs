use questlog_core::db::open_db_in_memory;
use questlog_core::{
    CategoryFilter, CategoryPatch, CategoryService, ProgressionService, RepoError,
    SqliteCategoryRepository, SqliteTaskRepository, SqliteUserRepository, TaskDraft,
    TaskListQuery, TaskPriority, TaskService, User, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn register_user(conn: &Connection, external_id: i64) -> User {
    ProgressionService::new(SqliteUserRepository::new(conn))
        .ensure_user(external_id, "tester")
        .unwrap()
}

fn categories(conn: &Connection) -> CategoryService<SqliteCategoryRepository<'_>> {
    CategoryService::new(SqliteCategoryRepository::new(conn))
}

fn create_task_in(
    conn: &Connection,
    user: &User,
    title: &str,
    category_uuid: Option<Uuid>,
) -> Uuid {
    TaskService::new(SqliteTaskRepository::new(conn))
        .create_task(
            user.uuid,
            TaskDraft {
                title: title.to_string(),
                priority: TaskPriority::Medium,
                category_uuid,
                ..TaskDraft::default()
            },
        )
        .unwrap()
        .uuid
}

#[test]
fn create_and_get_roundtrip_with_default_color() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3001);

    let service = categories(&conn);
    let category = service.create_category(user.uuid, "Работа", None).unwrap();
    assert_eq!(category.color, "#808080");

    let loaded = service
        .get_category(category.uuid, user.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, category);
}

#[test]
fn validation_rejects_bad_names_and_colors() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3002);
    let service = categories(&conn);

    let blank = service.create_category(user.uuid, "  ", None);
    assert!(matches!(
        blank,
        Err(RepoError::Validation(ValidationError::EmptyCategoryName))
    ));

    let oversize = service.create_category(user.uuid, "c".repeat(51), None);
    assert!(matches!(
        oversize,
        Err(RepoError::Validation(
            ValidationError::CategoryNameTooLong { length: 51 }
        ))
    ));

    let bad_color = service.create_category(user.uuid, "ok", Some("grey".to_string()));
    assert!(matches!(
        bad_color,
        Err(RepoError::Validation(ValidationError::InvalidColor(_)))
    ));
}

#[test]
fn list_orders_by_name_and_stays_per_user() {
    let conn = open_db_in_memory().unwrap();
    let owner = register_user(&conn, 3003);
    let stranger = register_user(&conn, 3004);
    let service = categories(&conn);

    service.create_category(owner.uuid, "work", None).unwrap();
    service.create_category(owner.uuid, "Home", None).unwrap();
    service.create_category(stranger.uuid, "other", None).unwrap();

    let names: Vec<_> = service
        .list_categories(owner.uuid)
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Home".to_string(), "work".to_string()]);
}

#[test]
fn update_applies_partial_patches_and_revalidates() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3005);
    let service = categories(&conn);

    let category = service
        .create_category(user.uuid, "errands", Some("#336699".to_string()))
        .unwrap();

    let renamed = service
        .update_category(
            category.uuid,
            user.uuid,
            CategoryPatch {
                name: Some("chores".to_string()),
                color: None,
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "chores");
    assert_eq!(renamed.color, "#336699");

    let bad_patch = service.update_category(
        category.uuid,
        user.uuid,
        CategoryPatch {
            name: None,
            color: Some("#33669".to_string()),
        },
    );
    assert!(matches!(
        bad_patch,
        Err(RepoError::Validation(ValidationError::InvalidColor(_)))
    ));
}

#[test]
fn categories_are_invisible_across_users() {
    let conn = open_db_in_memory().unwrap();
    let owner = register_user(&conn, 3006);
    let stranger = register_user(&conn, 3007);
    let service = categories(&conn);

    let category = service.create_category(owner.uuid, "private", None).unwrap();
    let tagged = create_task_in(&conn, &owner, "tagged", Some(category.uuid));

    assert!(service
        .get_category(category.uuid, stranger.uuid)
        .unwrap()
        .is_none());
    assert!(service
        .update_category(
            category.uuid,
            stranger.uuid,
            CategoryPatch {
                name: Some("hijack".to_string()),
                color: None,
            },
        )
        .unwrap()
        .is_none());
    assert!(!service.delete_category(category.uuid, stranger.uuid).unwrap());

    // The category survives, and so does the owner's task reference: a
    // foreign delete attempt must not clear it.
    assert!(service
        .get_category(category.uuid, owner.uuid)
        .unwrap()
        .is_some());
    let task = TaskService::new(SqliteTaskRepository::new(&conn))
        .get_task(tagged, owner.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(task.category_uuid, Some(category.uuid));
}

#[test]
fn deleting_a_category_clears_references_but_keeps_tasks() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3008);

    let category = categories(&conn)
        .create_category(user.uuid, "project", None)
        .unwrap();
    let tagged_a = create_task_in(&conn, &user, "tagged a", Some(category.uuid));
    let tagged_b = create_task_in(&conn, &user, "tagged b", Some(category.uuid));
    let untagged = create_task_in(&conn, &user, "untagged", None);

    assert!(categories(&conn)
        .delete_category(category.uuid, user.uuid)
        .unwrap());

    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));
    let all = tasks.list_tasks(user.uuid, &TaskListQuery::default()).unwrap();
    assert_eq!(all.len(), 3);
    for id in [tagged_a, tagged_b, untagged] {
        let task = tasks.get_task(id, user.uuid).unwrap().unwrap();
        assert!(task.category_uuid.is_none());
    }
}

#[test]
fn list_tasks_filters_by_category_and_uncategorized() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3009);

    let category = categories(&conn)
        .create_category(user.uuid, "focus", None)
        .unwrap();
    let tagged = create_task_in(&conn, &user, "tagged", Some(category.uuid));
    let untagged = create_task_in(&conn, &user, "untagged", None);

    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));
    let in_category = tasks
        .list_tasks(
            user.uuid,
            &TaskListQuery {
                category: CategoryFilter::In(category.uuid),
                ..TaskListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(in_category.len(), 1);
    assert_eq!(in_category[0].uuid, tagged);

    let uncategorized = tasks
        .list_tasks(
            user.uuid,
            &TaskListQuery {
                category: CategoryFilter::Uncategorized,
                ..TaskListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].uuid, untagged);
}

#[test]
fn category_stats_bucket_totals_and_done_counts() {
    let conn = open_db_in_memory().unwrap();
    let user = register_user(&conn, 3010);

    let category = categories(&conn)
        .create_category(user.uuid, "sprint", None)
        .unwrap();
    let tagged_done = create_task_in(&conn, &user, "tagged done", Some(category.uuid));
    create_task_in(&conn, &user, "tagged open", Some(category.uuid));
    create_task_in(&conn, &user, "loose open", None);
    TaskService::new(SqliteTaskRepository::new(&conn))
        .complete_task(tagged_done, user.uuid)
        .unwrap();

    let stats = categories(&conn).category_stats(user.uuid).unwrap();
    assert_eq!(stats.len(), 2);

    let sprint = &stats[0];
    assert_eq!(
        sprint.category.as_ref().map(|c| c.name.as_str()),
        Some("sprint")
    );
    assert_eq!(sprint.total_tasks, 2);
    assert_eq!(sprint.done_tasks, 1);

    let loose = &stats[1];
    assert!(loose.category.is_none());
    assert_eq!(loose.total_tasks, 1);
    assert_eq!(loose.done_tasks, 0);
}
