use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kanban::config::SecurityConfig;
use kanban::db::{NewActivity, NewUser, Store, TaskChanges};
use kanban::domain::{Actor, EntityType, Priority};
use kanban::services::scheduler::run_retention;
use kanban::services::{
    ActivityLedger, ActivityRecorder, ActivityService, BoardError, ChecklistService, ColumnOrder,
    ColumnService, CommentService, CreateTaskInput, SeaOrmActivityService, SeaOrmChecklistService,
    SeaOrmColumnService, SeaOrmCommentService, SeaOrmTaskService, TaskService,
};
use sea_orm::ConnectionTrait;

struct Board {
    store: Store,
    tasks: SeaOrmTaskService,
    columns: SeaOrmColumnService,
    comments: SeaOrmCommentService,
    checklists: SeaOrmChecklistService,
    activities: SeaOrmActivityService,
}

impl Board {
    async fn new() -> Self {
        let store = Store::new("sqlite::memory:")
            .await
            .expect("Failed to open in-memory store");
        let ledger = ActivityLedger::for_store(store.clone());
        Self::with_ledger(store, ledger)
    }

    fn with_ledger(store: Store, ledger: ActivityLedger) -> Self {
        Self {
            tasks: SeaOrmTaskService::new(store.clone(), ledger.clone()),
            columns: SeaOrmColumnService::new(store.clone(), ledger.clone()),
            comments: SeaOrmCommentService::new(store.clone(), ledger),
            checklists: SeaOrmChecklistService::new(store.clone()),
            activities: SeaOrmActivityService::new(store.clone()),
            store,
        }
    }

    async fn user(&self, username: &str, is_root: bool) -> Actor {
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let user = self
            .store
            .create_user(
                NewUser {
                    username: username.to_string(),
                    password: "secret".to_string(),
                    name: None,
                    designation: None,
                    is_root,
                },
                &security,
            )
            .await
            .expect("Failed to create user");
        Actor::new(user.id, user.is_root)
    }

    async fn column(&self, actor: Actor, title: &str) -> i32 {
        self.columns
            .create(actor, title, None)
            .await
            .expect("Failed to create column")
            .id
    }

    async fn task(&self, actor: Actor, column_id: i32, title: &str) -> i32 {
        self.tasks
            .create(actor, new_task(column_id, title))
            .await
            .expect("Failed to create task")
            .id
    }

    /// Task IDs of a column in position order, with their positions.
    async fn layout(&self, column_id: i32) -> Vec<(i32, i32)> {
        let mut tasks = self
            .store
            .list_tasks_in_column(column_id)
            .await
            .expect("Failed to list column");
        tasks.sort_by_key(|t| t.position);
        tasks.into_iter().map(|t| (t.id, t.position)).collect()
    }

    async fn order(&self, column_id: i32) -> Vec<i32> {
        self.layout(column_id).await.into_iter().map(|(id, _)| id).collect()
    }

    async fn positions(&self, column_id: i32) -> Vec<i32> {
        self.layout(column_id).await.into_iter().map(|(_, p)| p).collect()
    }
}

fn new_task(column_id: i32, title: &str) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_string(),
        description: None,
        column_id,
        assigned_to: None,
        due_date: None,
        priority: None,
        weight: 0,
    }
}

fn assert_no_duplicates(positions: &[i32]) {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), positions.len(), "duplicate positions: {positions:?}");
}

/// Always fails, to prove the audit trail never affects the mutation result.
struct BrokenRecorder {
    calls: AtomicUsize,
}

#[async_trait]
impl ActivityRecorder for BrokenRecorder {
    async fn append(&self, _entry: &NewActivity) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("activity store unavailable")
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_first_task_in_empty_column_gets_position_one() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let task = board
        .tasks
        .create(root, new_task(todo, "Write spec"))
        .await
        .unwrap();

    assert_eq!(task.position, 1);
    assert_eq!(task.column_title.as_deref(), Some("Todo"));
}

#[tokio::test]
async fn test_tasks_append_to_column_tail() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    for title in ["One", "Two", "Three"] {
        board.task(root, todo, title).await;
    }

    assert_eq!(board.positions(todo).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_move_within_column_keeps_positions_unique() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let a = board.task(root, todo, "Alpha").await;
    let b = board.task(root, todo, "Bravo").await;
    let c = board.task(root, todo, "Charlie").await;

    let moved = board.tasks.move_task(root, a, todo, 3).await.unwrap();
    assert_eq!(moved.position, 3);

    assert_eq!(board.order(todo).await, vec![b, c, a]);
    assert_eq!(board.positions(todo).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_repeated_moves_never_duplicate_positions() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let doing = board.column(root, "Doing").await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(board.task(root, todo, &format!("Task {i}")).await);
    }

    let moves = [
        (ids[0], doing, 1),
        (ids[3], doing, 1),
        (ids[1], todo, 1),
        (ids[4], doing, 2),
        (ids[0], todo, 2),
        (ids[2], doing, 99),
        (ids[3], doing, 3),
    ];

    for (task, column, position) in moves {
        board.tasks.move_task(root, task, column, position).await.unwrap();
        assert_no_duplicates(&board.positions(todo).await);
        assert_no_duplicates(&board.positions(doing).await);
    }

    let total = board.layout(todo).await.len() + board.layout(doing).await.len();
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_move_clamps_position_to_tail() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let done = board.column(root, "Done").await;

    let a = board.task(root, todo, "Alpha").await;
    board.task(root, done, "Existing").await;

    let moved = board.tasks.move_task(root, a, done, 50).await.unwrap();
    assert_eq!(moved.position, 2);
    assert_eq!(moved.column_id, done);
    assert!(board.layout(todo).await.is_empty());
}

#[tokio::test]
async fn test_move_rejects_zero_position_and_unknown_column() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let a = board.task(root, todo, "Alpha").await;

    let err = board.tasks.move_task(root, a, todo, 0).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));

    let err = board.tasks.move_task(root, a, 999, 1).await.unwrap_err();
    assert!(matches!(err, BoardError::InvalidReference(_)));

    let err = board.tasks.move_task(root, 999, todo, 1).await.unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_task_closes_gap() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let a = board.task(root, todo, "Alpha").await;
    let b = board.task(root, todo, "Bravo").await;
    let c = board.task(root, todo, "Charlie").await;

    board.tasks.delete(root, b).await.unwrap();

    assert_eq!(board.layout(todo).await, vec![(a, 1), (c, 2)]);
}

#[tokio::test]
async fn test_update_with_column_change_appends_to_target() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let done = board.column(root, "Done").await;

    let a = board.task(root, todo, "Alpha").await;
    let b = board.task(root, todo, "Bravo").await;
    let existing = board.task(root, done, "Shipped").await;

    let updated = board
        .tasks
        .update(
            root,
            a,
            TaskChanges {
                column_id: Some(done),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.column_id, done);
    assert_eq!(updated.position, 2);
    assert_eq!(board.layout(done).await, vec![(existing, 1), (a, 2)]);
    assert_eq!(board.layout(todo).await, vec![(b, 1)]);

    let history = board.activities.for_task(a).await.unwrap();
    assert!(history.iter().any(|e| e.action == "moved"
        && e.field_name.as_deref() == Some("column")
        && e.old_value.as_deref() == Some("Todo")
        && e.new_value.as_deref() == Some("Done")));
}

// ============================================================================
// Columns
// ============================================================================

#[tokio::test]
async fn test_drain_preserves_relative_order_then_delete_succeeds() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    let first = board.task(root, a, "First").await;
    let second = board.task(root, a, "Second").await;

    let moved = board.columns.move_all_tasks(root, a, b).await.unwrap();
    assert_eq!(moved, 2);

    assert_eq!(board.layout(b).await, vec![(first, 1), (second, 2)]);
    assert!(board.layout(a).await.is_empty());

    board.columns.delete(root, a).await.unwrap();
    let remaining = board.columns.list(true).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b);
    assert_eq!(remaining[0].task_count, 2);
}

#[tokio::test]
async fn test_drain_appends_behind_existing_tasks() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    let x = board.task(root, a, "Xray").await;
    let y = board.task(root, a, "Yankee").await;
    let z = board.task(root, a, "Zulu").await;
    let kept = board.task(root, b, "Kept").await;

    board.columns.move_all_tasks(root, a, b).await.unwrap();

    assert_eq!(board.order(b).await, vec![kept, x, y, z]);
    assert_no_duplicates(&board.positions(b).await);
}

#[tokio::test]
async fn test_drain_rejects_same_or_unknown_column() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;

    let err = board.columns.move_all_tasks(root, a, a).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));

    let err = board.columns.move_all_tasks(root, a, 42).await.unwrap_err();
    assert!(matches!(err, BoardError::InvalidReference(_)));
}

#[tokio::test]
async fn test_cannot_delete_last_column() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let only = board.column(root, "Only").await;

    let err = board.columns.delete(root, only).await.unwrap_err();
    match err {
        BoardError::Conflict(msg) => assert_eq!(msg, "cannot delete the last column"),
        other => panic!("expected conflict, got {other:?}"),
    }

    board.task(root, only, "Still here").await;
    let err = board.columns.delete(root, only).await.unwrap_err();
    match err {
        BoardError::Conflict(msg) => assert_eq!(msg, "cannot delete the last column"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cannot_delete_column_with_tasks() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;
    let task = board.task(root, a, "Pending").await;

    let err = board.columns.delete(root, a).await.unwrap_err();
    match err {
        BoardError::Conflict(msg) => assert_eq!(msg, "cannot delete column with existing tasks"),
        other => panic!("expected conflict, got {other:?}"),
    }

    board.tasks.delete(root, task).await.unwrap();
    board.columns.delete(root, a).await.unwrap();
    assert!(board.columns.get(a).await.is_err());
    assert!(board.columns.get(b).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_column_title_conflicts() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    board.column(root, "Todo").await;
    let doing = board.column(root, "Doing").await;

    let err = board.columns.create(root, "Todo", None).await.unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    let err = board
        .columns
        .update(root, doing, Some("Todo".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));
}

#[tokio::test]
async fn test_archive_rules() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    let archived = board.columns.archive(root, a).await.unwrap();
    assert!(archived.is_archived);

    let err = board.columns.archive(root, b).await.unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    let err = board.tasks.create(root, new_task(a, "Hidden")).await.unwrap_err();
    assert!(matches!(err, BoardError::InvalidReference(_)));

    assert_eq!(board.columns.list(false).await.unwrap().len(), 1);
    assert_eq!(board.columns.list(true).await.unwrap().len(), 2);

    let restored = board.columns.unarchive(root, a).await.unwrap();
    assert!(!restored.is_archived);
}

#[tokio::test]
async fn test_reorder_columns() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;
    let c = board.column(root, "C").await;

    let columns = board
        .columns
        .reorder(
            root,
            &[
                ColumnOrder { id: c, position: 1 },
                ColumnOrder { id: a, position: 2 },
                ColumnOrder { id: b, position: 3 },
            ],
        )
        .await
        .unwrap();

    let ids: Vec<i32> = columns.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c, a, b]);

    let err = board
        .columns
        .reorder(
            root,
            &[
                ColumnOrder { id: a, position: 1 },
                ColumnOrder { id: 999, position: 2 },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));

    // The failed request must not have touched anything.
    let ids: Vec<i32> = board
        .columns
        .list(false)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![c, a, b]);

    let err = board
        .columns
        .reorder(
            root,
            &[
                ColumnOrder { id: a, position: 1 },
                ColumnOrder { id: a, position: 2 },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
}

#[tokio::test]
async fn test_failed_reorder_write_rolls_back() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    // The first row is written before the missing one is reached.
    let result = board.store.reorder_columns(&[(a, 7), (999, 8), (b, 9)]).await;
    assert!(result.is_err());

    let a_row = board.store.find_column(a).await.unwrap().unwrap();
    let b_row = board.store.find_column(b).await.unwrap().unwrap();
    assert_eq!((a_row.position, b_row.position), (1, 2));
}

#[tokio::test]
async fn test_concurrent_deletes_keep_one_column() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    let (first, second) =
        tokio::join!(board.columns.delete(root, a), board.columns.delete(root, b));

    let failures: Vec<BoardError> = [first, second].into_iter().filter_map(Result::err).collect();
    assert_eq!(failures.len(), 1, "exactly one delete must be refused");
    assert!(
        matches!(&failures[0], BoardError::Conflict(msg) if msg == "cannot delete the last column")
    );
    assert_eq!(board.columns.list(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_archives_keep_one_open_column() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let a = board.column(root, "A").await;
    let b = board.column(root, "B").await;

    let (first, second) =
        tokio::join!(board.columns.archive(root, a), board.columns.archive(root, b));

    let failures: Vec<BoardError> = [first, second].into_iter().filter_map(Result::err).collect();
    assert_eq!(failures.len(), 1, "exactly one archive must be refused");
    assert!(
        matches!(&failures[0], BoardError::Conflict(msg) if msg == "cannot archive the last column")
    );
    assert_eq!(board.columns.list(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_with_same_title_conflict() {
    let board = Board::new().await;
    let root = board.user("root", true).await;

    let (first, second) = tokio::join!(
        board.columns.create(root, "Todo", None),
        board.columns.create(root, "Todo", None)
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.into_iter().find_map(Result::err).unwrap();
    match err {
        BoardError::Conflict(msg) => assert_eq!(msg, "a column titled 'Todo' already exists"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_column_view_carries_creator_summary() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let column = board.columns.get(todo).await.unwrap();
    assert_eq!(column.created_by, Some(root.id));
    assert_eq!(column.creator.as_ref().map(|u| u.username.as_str()), Some("root"));

    let listed = board.columns.list(false).await.unwrap();
    assert_eq!(listed[0].creator.as_ref().map(|u| u.id), Some(root.id));
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_only_creator_or_root_may_update_or_delete() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let alice = board.user("alice", false).await;
    let bob = board.user("bob", false).await;
    let todo = board.column(root, "Todo").await;

    let task = board.task(alice, todo, "Alice's task").await;
    let rename = |title: &str| TaskChanges {
        title: Some(title.to_string()),
        ..TaskChanges::default()
    };

    let err = board.tasks.update(bob, task, rename("Hijacked")).await.unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));
    let err = board.tasks.delete(bob, task).await.unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));

    let updated = board.tasks.update(alice, task, rename("Edited")).await.unwrap();
    assert_eq!(updated.title, "Edited");

    let updated = board.tasks.update(root, task, rename("Root edit")).await.unwrap();
    assert_eq!(updated.title, "Root edit");

    board.tasks.delete(root, task).await.unwrap();
    assert!(matches!(
        board.tasks.get(task).await.unwrap_err(),
        BoardError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_comment_edits_are_author_only() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let alice = board.user("alice", false).await;
    let todo = board.column(root, "Todo").await;
    let task = board.task(alice, todo, "Discuss").await;

    let comment = board.comments.create(alice, task, "First!").await.unwrap();
    assert_eq!(comment.created_by, alice.id);

    let err = board.comments.update(root, comment.id, "Root edit").await.unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));
    let err = board.comments.delete(root, comment.id).await.unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));

    let edited = board.comments.update(alice, comment.id, "Edited").await.unwrap();
    assert_eq!(edited.content, "Edited");

    let err = board.comments.create(alice, 999, "Orphan").await.unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));

    board.comments.delete(alice, comment.id).await.unwrap();
    let err = board.comments.delete(alice, comment.id).await.unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[tokio::test]
async fn test_checklist_toggle_is_open_but_rename_is_owned() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let alice = board.user("alice", false).await;
    let bob = board.user("bob", false).await;
    let todo = board.column(root, "Todo").await;
    let task = board.task(alice, todo, "Release").await;

    let item = board.checklists.create(alice, task, "Tag build").await.unwrap();
    assert!(!item.is_completed);

    let toggled = board.checklists.toggle(bob, item.id).await.unwrap();
    assert!(toggled.is_completed);
    assert_eq!(toggled.completed_by, Some(bob.id));

    let reopened = board.checklists.toggle(alice, item.id).await.unwrap();
    assert!(!reopened.is_completed);

    let err = board.checklists.rename(bob, item.id, "Mine now").await.unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));

    let renamed = board.checklists.rename(root, item.id, "Tag v1").await.unwrap();
    assert_eq!(renamed.title, "Tag v1");

    board.checklists.delete(alice, item.id).await.unwrap();
    assert!(board.checklists.list_for_task(task).await.unwrap().is_empty());
}

// ============================================================================
// Activity ledger
// ============================================================================

#[tokio::test]
async fn test_unchanged_title_logs_nothing_and_priority_change_logs_once() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let task = board
        .tasks
        .create(
            root,
            CreateTaskInput {
                priority: Some(Priority::Low),
                ..new_task(todo, "Stable title")
            },
        )
        .await
        .unwrap();

    let before = board.activities.for_task(task.id).await.unwrap().len();

    board
        .tasks
        .update(
            root,
            task.id,
            TaskChanges {
                title: Some("Stable title".to_string()),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(board.activities.for_task(task.id).await.unwrap().len(), before);

    board
        .tasks
        .update(
            root,
            task.id,
            TaskChanges {
                priority: Some(Priority::High),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

    let history = board.activities.for_task(task.id).await.unwrap();
    let priority: Vec<_> = history
        .iter()
        .filter(|e| e.field_name.as_deref() == Some("priority"))
        .collect();
    assert_eq!(priority.len(), 1);
    assert_eq!(priority[0].action, "priority_changed");
    assert_eq!(priority[0].old_value.as_deref(), Some("low"));
    assert_eq!(priority[0].new_value.as_deref(), Some("high"));
    assert_eq!(history.len(), before + 1);
}

#[tokio::test]
async fn test_assignment_renders_display_names() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let alice = board.user("alice", false).await;
    let todo = board.column(root, "Todo").await;
    let task = board.task(root, todo, "Assign me").await;

    board
        .tasks
        .update(
            root,
            task,
            TaskChanges {
                assigned_to: Some(Some(alice.id)),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

    let history = board.activities.for_task(task).await.unwrap();
    let assigned = history
        .iter()
        .find(|e| e.action == "assigned")
        .expect("assignment was not recorded");
    assert_eq!(assigned.old_value.as_deref(), Some("Unassigned"));
    assert_eq!(assigned.new_value.as_deref(), Some("alice"));

    let details = board.tasks.get(task).await.unwrap();
    assert_eq!(details.assigned_to, Some(alice.id));

    let cleared = board
        .tasks
        .update(
            root,
            task,
            TaskChanges {
                assigned_to: Some(None),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.assigned_to, None);
}

#[tokio::test]
async fn test_history_survives_task_deletion() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let task = board.task(root, todo, "Short lived").await;

    board.tasks.delete(root, task).await.unwrap();

    let history = board.activities.for_task(task).await.unwrap();
    assert_eq!(history[0].action, "deleted");
    assert_eq!(history[0].old_value.as_deref(), Some("Short lived"));
    assert_eq!(history.last().unwrap().action, "created");
    assert_eq!(history.last().unwrap().new_value.as_deref(), Some("Short lived"));
    assert_eq!(history[0].entity_type, EntityType::Task.as_str());
}

#[tokio::test]
async fn test_failing_ledger_never_fails_mutations() {
    let store = Store::new("sqlite::memory:").await.unwrap();
    let recorder = Arc::new(BrokenRecorder {
        calls: AtomicUsize::new(0),
    });
    let board = Board::with_ledger(store, ActivityLedger::new(recorder.clone()));

    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;

    let created = board
        .tasks
        .create(root, new_task(todo, "Resilient"))
        .await
        .expect("create must succeed despite audit failure");
    assert_eq!(created.position, 1);

    let updated = board
        .tasks
        .update(
            root,
            created.id,
            TaskChanges {
                title: Some("Still resilient".to_string()),
                priority: Some(Priority::Urgent),
                ..TaskChanges::default()
            },
        )
        .await
        .expect("update must succeed despite audit failure");
    assert_eq!(updated.title, "Still resilient");
    assert_eq!(updated.priority.as_deref(), Some("urgent"));

    board
        .tasks
        .delete(root, created.id)
        .await
        .expect("delete must succeed despite audit failure");
    assert!(board.tasks.get(created.id).await.is_err());

    assert!(recorder.calls.load(Ordering::SeqCst) >= 4);
    assert_eq!(board.store.count_activities().await.unwrap(), 0);
}

#[tokio::test]
async fn test_retention_removes_only_old_entries() {
    let board = Board::new().await;
    let root = board.user("root", true).await;
    let todo = board.column(root, "Todo").await;
    let old = board.task(root, todo, "Ancient").await;
    let fresh = board.task(root, todo, "Recent").await;

    board
        .store
        .conn
        .execute_unprepared(&format!(
            "UPDATE activities SET created_at = datetime('now', '-120 days') \
             WHERE entity_type = 'task' AND entity_id = {old}"
        ))
        .await
        .unwrap();

    let err = board.activities.prune(0).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));

    let report = run_retention(&board.store, 90).await.unwrap();
    assert_eq!(report.activities, 1);

    assert!(board.activities.for_task(old).await.unwrap().is_empty());
    assert_eq!(board.activities.for_task(fresh).await.unwrap().len(), 1);
}
