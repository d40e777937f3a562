use todolist_core::db::open_db_in_memory;
use todolist_core::{
    GroupRepository, RepoError, SqliteGroupRepository, SqliteTodoRepository, TodoRepository,
    ValidationError,
};
use uuid::Uuid;

#[test]
fn create_sets_defaults_and_returns_joined_view() {
    let mut conn = open_db_in_memory().unwrap();

    let group = {
        let repo = SqliteGroupRepository::new(&mut conn);
        repo.create_group("Chores", "#00aa00").unwrap()
    };

    let repo = SqliteTodoRepository::new(&conn);
    let view = repo
        .create_todo("water plants", "back porch first", Some(group.id), Some("2026-09-01"))
        .unwrap();

    assert_eq!(view.todo.title, "water plants");
    assert_eq!(view.todo.description, "back porch first");
    assert_eq!(view.todo.group_id, Some(group.id));
    assert_eq!(view.todo.due_date.as_deref(), Some("2026-09-01"));
    assert!(!view.todo.completed);
    assert_eq!(view.todo.completed_at, None);
    assert!(view.todo.is_active());
    assert_eq!(view.group_name.as_deref(), Some("Chores"));
    assert_eq!(view.group_color.as_deref(), Some("#00aa00"));
}

#[test]
fn ungrouped_view_has_null_group_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let view = repo.create_todo("solo task", "", None, None).unwrap();
    assert_eq!(view.todo.group_id, None);
    assert_eq!(view.group_name, None);
    assert_eq!(view.group_color, None);
}

#[test]
fn create_with_unknown_group_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let err = repo
        .create_todo("orphan", "", Some(Uuid::new_v4()), None)
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));
}

#[test]
fn update_replaces_all_editable_fields() {
    let mut conn = open_db_in_memory().unwrap();

    let group = {
        let repo = SqliteGroupRepository::new(&mut conn);
        repo.create_group("Target", "#0000ff").unwrap()
    };

    let repo = SqliteTodoRepository::new(&conn);
    let created = repo.create_todo("draft", "old text", None, None).unwrap();

    let updated = repo
        .update_todo(
            created.todo.id,
            "final",
            "new text",
            Some(group.id),
            Some("2026-12-24"),
        )
        .unwrap();

    assert_eq!(updated.todo.title, "final");
    assert_eq!(updated.todo.description, "new text");
    assert_eq!(updated.todo.group_id, Some(group.id));
    assert_eq!(updated.todo.due_date.as_deref(), Some("2026-12-24"));
    assert_eq!(updated.group_name.as_deref(), Some("Target"));
}

#[test]
fn update_missing_todo_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let missing = Uuid::new_v4();
    let err = repo
        .update_todo(missing, "ghost", "", None, None)
        .unwrap_err();
    assert!(matches!(err, RepoError::TodoNotFound(id) if id == missing));
}

#[test]
fn update_deleted_todo_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let created = repo.create_todo("short lived", "", None, None).unwrap();
    repo.soft_delete_todo(created.todo.id).unwrap();

    let err = repo
        .update_todo(created.todo.id, "revive", "", None, None)
        .unwrap_err();
    assert!(matches!(err, RepoError::TodoNotFound(_)));
}

#[test]
fn toggle_complete_is_its_own_inverse() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let created = repo.create_todo("flip me", "", None, None).unwrap();

    let completed = repo.toggle_complete(created.todo.id).unwrap();
    assert!(completed.todo.completed);
    assert!(completed.todo.completed_at.is_some());

    let reverted = repo.toggle_complete(created.todo.id).unwrap();
    assert!(!reverted.todo.completed);
    assert_eq!(reverted.todo.completed_at, None);
}

#[test]
fn toggle_missing_or_deleted_todo_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let err = repo.toggle_complete(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::TodoNotFound(_)));

    let created = repo.create_todo("gone soon", "", None, None).unwrap();
    repo.soft_delete_todo(created.todo.id).unwrap();
    let err = repo.toggle_complete(created.todo.id).unwrap_err();
    assert!(matches!(err, RepoError::TodoNotFound(_)));
}

#[test]
fn delete_is_idempotent_with_stable_observable_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let created = repo.create_todo("delete twice", "", None, None).unwrap();

    repo.soft_delete_todo(created.todo.id).unwrap();
    assert!(repo.get_todo(created.todo.id).unwrap().is_none());

    conn.execute(
        "UPDATE todos SET deleted_at = '2020-01-01 00:00:00' WHERE id = ?1;",
        [created.todo.id.to_string()],
    )
    .unwrap();

    repo.soft_delete_todo(created.todo.id).unwrap();
    repo.soft_delete_todo(Uuid::new_v4()).unwrap();

    let stamp: String = conn
        .query_row(
            "SELECT deleted_at FROM todos WHERE id = ?1;",
            [created.todo.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stamp, "2020-01-01 00:00:00");
}

#[test]
fn stats_count_live_rows_and_derive_pending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let a = repo.create_todo("a", "", None, None).unwrap();
    let b = repo.create_todo("b", "", None, None).unwrap();
    let c = repo.create_todo("c", "", None, None).unwrap();
    repo.toggle_complete(a.todo.id).unwrap();
    repo.soft_delete_todo(c.todo.id).unwrap();

    let stats = repo.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, stats.total - stats.completed);

    repo.soft_delete_todo(b.todo.id).unwrap();
    repo.soft_delete_todo(a.todo.id).unwrap();
    let stats = repo.stats().unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.pending, 0);
}

#[test]
fn validation_rejects_bad_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let err = repo.create_todo("", "", None, None).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyTitle)
    ));

    let err = repo
        .create_todo("dated", "", None, Some("next tuesday"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidDate(_))
    ));
}
