use todolist_core::db::open_db_in_memory;
use todolist_core::{Group, SqliteTodoRepository, TodoRepository, TodoStats, TodoView};
use uuid::Uuid;

#[test]
fn group_serialization_uses_expected_wire_fields() {
    let group = Group {
        id: Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
        name: "Work".to_string(),
        color: "#6366f1".to_string(),
        sort_order: 0,
        created_at: "2026-01-02 03:04:05".to_string(),
        updated_at: "2026-01-02 03:04:05".to_string(),
        deleted_at: None,
    };

    let json = serde_json::to_value(&group).unwrap();
    assert_eq!(json["id"], group.id.to_string());
    assert_eq!(json["name"], "Work");
    assert_eq!(json["color"], "#6366f1");
    assert_eq!(json["sort_order"], 0);
    assert_eq!(json["deleted_at"], serde_json::Value::Null);

    let decoded: Group = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, group);
}

#[test]
fn todo_view_serializes_flat_with_group_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::new(&conn);

    let view = repo
        .create_todo("wire check", "body", None, Some("2026-08-09"))
        .unwrap();

    let json = serde_json::to_value(&view).unwrap();
    // Flat projection: todo fields and group display fields share one level.
    assert_eq!(json["id"], view.todo.id.to_string());
    assert_eq!(json["title"], "wire check");
    assert_eq!(json["description"], "body");
    assert_eq!(json["due_date"], "2026-08-09");
    assert_eq!(json["completed"], false);
    assert_eq!(json["group_id"], serde_json::Value::Null);
    assert_eq!(json["group_name"], serde_json::Value::Null);
    assert_eq!(json["group_color"], serde_json::Value::Null);

    let decoded: TodoView = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, view);
}

#[test]
fn stats_serialize_all_three_counters() {
    let stats = TodoStats {
        total: 5,
        completed: 2,
        pending: 3,
    };

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["total"], 5);
    assert_eq!(json["completed"], 2);
    assert_eq!(json["pending"], 3);
}
