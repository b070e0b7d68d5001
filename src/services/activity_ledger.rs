//! Best-effort audit trail for board mutations.
//!
//! The ledger is called after the primary write has committed. An append that
//! fails is logged as a warning and otherwise ignored, so the audit trail can
//! never fail or roll back the mutation it describes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::db::{NewActivity, Store, TaskChanges, UserSummary};
use crate::domain::{ActivityAction, EntityType};
use crate::entities::tasks;

const EMPTY: &str = "(empty)";
const NO_PRIORITY: &str = "(none)";
const UNASSIGNED: &str = "Unassigned";

/// Sink for activity rows.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    async fn append(&self, entry: &NewActivity) -> anyhow::Result<()>;
}

/// Writes activity rows to the `activities` table.
pub struct SeaOrmActivityRecorder {
    store: Store,
}

impl SeaOrmActivityRecorder {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivityRecorder for SeaOrmActivityRecorder {
    async fn append(&self, entry: &NewActivity) -> anyhow::Result<()> {
        self.store.append_activity(entry).await
    }
}

/// One field that an update request actually changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title { old: String, new: String },
    Description { old: Option<String>, new: Option<String> },
    Priority { old: Option<String>, new: String },
    Assignee { old: Option<i32>, new: Option<i32> },
}

impl FieldChange {
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Title { .. } => "title",
            Self::Description { .. } => "description",
            Self::Priority { .. } => "priority",
            Self::Assignee { .. } => "assignee",
        }
    }

    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        match self {
            Self::Title { .. } | Self::Description { .. } => ActivityAction::Updated,
            Self::Priority { .. } => ActivityAction::PriorityChanged,
            Self::Assignee { .. } => ActivityAction::Assigned,
        }
    }

    /// User IDs whose names are needed to render this change.
    #[must_use]
    pub fn user_ids(&self) -> Vec<i32> {
        match self {
            Self::Assignee { old, new } => old.iter().chain(new.iter()).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Human-readable `(old, new)` pair as stored in the activity row.
    #[must_use]
    pub fn render(&self, people: &HashMap<i32, UserSummary>) -> (String, String) {
        match self {
            Self::Title { old, new } => (old.clone(), new.clone()),
            Self::Description { old, new } => (or_empty(old.as_deref()), or_empty(new.as_deref())),
            Self::Priority { old, new } => (
                old.clone().unwrap_or_else(|| NO_PRIORITY.to_string()),
                new.clone(),
            ),
            Self::Assignee { old, new } => {
                (person_name(*old, people), person_name(*new, people))
            }
        }
    }
}

fn or_empty(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY.to_string(),
    }
}

fn person_name(id: Option<i32>, people: &HashMap<i32, UserSummary>) -> String {
    match id {
        None => UNASSIGNED.to_string(),
        Some(id) => people
            .get(&id)
            .map_or_else(|| format!("User #{id}"), |u| u.display_name().to_string()),
    }
}

/// Fields of `changes` whose requested value differs from `current`.
///
/// Absent fields are "no change requested" and never produce an entry.
#[must_use]
pub fn diff_task(current: &tasks::Model, changes: &TaskChanges) -> Vec<FieldChange> {
    let mut diff = Vec::new();

    if let Some(title) = &changes.title
        && *title != current.title
    {
        diff.push(FieldChange::Title {
            old: current.title.clone(),
            new: title.clone(),
        });
    }

    if let Some(description) = &changes.description {
        let old = current.description.as_deref().unwrap_or("");
        if description != old {
            diff.push(FieldChange::Description {
                old: current.description.clone().filter(|d| !d.is_empty()),
                new: Some(description.clone()).filter(|d| !d.is_empty()),
            });
        }
    }

    if let Some(priority) = changes.priority
        && current.priority.as_deref() != Some(priority.as_str())
    {
        diff.push(FieldChange::Priority {
            old: current.priority.clone(),
            new: priority.as_str().to_string(),
        });
    }

    if let Some(assigned_to) = changes.assigned_to
        && assigned_to != current.assigned_to
    {
        diff.push(FieldChange::Assignee {
            old: current.assigned_to,
            new: assigned_to,
        });
    }

    diff
}

/// Appends activity rows, logging and discarding any failure.
#[derive(Clone)]
pub struct ActivityLedger {
    recorder: Arc<dyn ActivityRecorder>,
}

impl ActivityLedger {
    #[must_use]
    pub fn new(recorder: Arc<dyn ActivityRecorder>) -> Self {
        Self { recorder }
    }

    #[must_use]
    pub fn for_store(store: Store) -> Self {
        Self::new(Arc::new(SeaOrmActivityRecorder::new(store)))
    }

    pub async fn record_created(
        &self,
        entity_type: EntityType,
        entity_id: i32,
        actor_id: i32,
        summary: &str,
    ) {
        self.append(NewActivity {
            entity_type,
            entity_id,
            action: ActivityAction::Created,
            field_name: None,
            old_value: None,
            new_value: Some(summary.to_string()),
            user_id: actor_id,
        })
        .await;
    }

    pub async fn record_updated(
        &self,
        entity_type: EntityType,
        entity_id: i32,
        actor_id: i32,
        field: &str,
        old_value: &str,
        new_value: &str,
    ) {
        self.append(field_entry(
            entity_type,
            entity_id,
            actor_id,
            ActivityAction::Updated,
            field,
            old_value,
            new_value,
        ))
        .await;
    }

    pub async fn record_deleted(
        &self,
        entity_type: EntityType,
        entity_id: i32,
        actor_id: i32,
        summary: &str,
    ) {
        self.append(NewActivity {
            entity_type,
            entity_id,
            action: ActivityAction::Deleted,
            field_name: None,
            old_value: Some(summary.to_string()),
            new_value: None,
            user_id: actor_id,
        })
        .await;
    }

    pub async fn record_moved(
        &self,
        entity_type: EntityType,
        entity_id: i32,
        actor_id: i32,
        field: &str,
        from: &str,
        to: &str,
    ) {
        self.append(field_entry(
            entity_type,
            entity_id,
            actor_id,
            ActivityAction::Moved,
            field,
            from,
            to,
        ))
        .await;
    }

    pub async fn record_assigned(&self, task_id: i32, actor_id: i32, old: &str, new: &str) {
        self.append(field_entry(
            EntityType::Task,
            task_id,
            actor_id,
            ActivityAction::Assigned,
            "assignee",
            old,
            new,
        ))
        .await;
    }

    pub async fn record_priority_changed(&self, task_id: i32, actor_id: i32, old: &str, new: &str) {
        self.append(field_entry(
            EntityType::Task,
            task_id,
            actor_id,
            ActivityAction::PriorityChanged,
            "priority",
            old,
            new,
        ))
        .await;
    }

    pub async fn record_commented(&self, task_id: i32, actor_id: i32) {
        self.append(NewActivity {
            entity_type: EntityType::Task,
            entity_id: task_id,
            action: ActivityAction::Commented,
            field_name: None,
            old_value: None,
            new_value: None,
            user_id: actor_id,
        })
        .await;
    }

    /// One row per changed task field.
    pub async fn record_task_changes(
        &self,
        task_id: i32,
        actor_id: i32,
        changes: &[FieldChange],
        people: &HashMap<i32, UserSummary>,
    ) {
        for change in changes {
            let (old, new) = change.render(people);
            match change.action() {
                ActivityAction::Assigned => {
                    self.record_assigned(task_id, actor_id, &old, &new).await;
                }
                ActivityAction::PriorityChanged => {
                    self.record_priority_changed(task_id, actor_id, &old, &new)
                        .await;
                }
                _ => {
                    self.record_updated(
                        EntityType::Task,
                        task_id,
                        actor_id,
                        change.field_name(),
                        &old,
                        &new,
                    )
                    .await;
                }
            }
        }
    }

    async fn append(&self, entry: NewActivity) {
        if let Err(e) = self.recorder.append(&entry).await {
            warn!(
                event = "activity_write_failed",
                entity_type = %entry.entity_type,
                entity_id = entry.entity_id,
                action = %entry.action,
                error = %e,
                "Failed to record activity"
            );
        }
    }
}

fn field_entry(
    entity_type: EntityType,
    entity_id: i32,
    actor_id: i32,
    action: ActivityAction,
    field: &str,
    old_value: &str,
    new_value: &str,
) -> NewActivity {
    NewActivity {
        entity_type,
        entity_id,
        action,
        field_name: Some(field.to_string()),
        old_value: Some(old_value.to_string()),
        new_value: Some(new_value.to_string()),
        user_id: actor_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingRecorder {
        entries: Mutex<Vec<NewActivity>>,
    }

    #[async_trait]
    impl ActivityRecorder for CapturingRecorder {
        async fn append(&self, entry: &NewActivity) -> anyhow::Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct BrokenRecorder;

    #[async_trait]
    impl ActivityRecorder for BrokenRecorder {
        async fn append(&self, _entry: &NewActivity) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn task() -> tasks::Model {
        tasks::Model {
            id: 1,
            title: "Write docs".to_string(),
            description: None,
            column_id: 1,
            assigned_to: None,
            created_by: 1,
            due_date: None,
            priority: Some("low".to_string()),
            position: 1,
            weight: 0,
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_unchanged_title_produces_no_diff() {
        let changes = TaskChanges {
            title: Some("Write docs".to_string()),
            ..TaskChanges::default()
        };
        assert!(diff_task(&task(), &changes).is_empty());
    }

    #[test]
    fn test_absent_fields_are_not_changes() {
        assert!(diff_task(&task(), &TaskChanges::default()).is_empty());
    }

    #[test]
    fn test_priority_change_only() {
        let changes = TaskChanges {
            priority: Some(Priority::High),
            ..TaskChanges::default()
        };
        let diff = diff_task(&task(), &changes);
        assert_eq!(
            diff,
            vec![FieldChange::Priority {
                old: Some("low".to_string()),
                new: "high".to_string(),
            }]
        );
        assert_eq!(diff[0].action(), ActivityAction::PriorityChanged);
        assert_eq!(
            diff[0].render(&HashMap::new()),
            ("low".to_string(), "high".to_string())
        );
    }

    #[test]
    fn test_description_renders_empty_sentinel() {
        let changes = TaskChanges {
            description: Some("Details".to_string()),
            ..TaskChanges::default()
        };
        let diff = diff_task(&task(), &changes);
        assert_eq!(diff.len(), 1);
        assert_eq!(
            diff[0].render(&HashMap::new()),
            ("(empty)".to_string(), "Details".to_string())
        );
    }

    #[test]
    fn test_clearing_empty_description_is_not_a_change() {
        let changes = TaskChanges {
            description: Some(String::new()),
            ..TaskChanges::default()
        };
        assert!(diff_task(&task(), &changes).is_empty());
    }

    #[test]
    fn test_assignee_renders_display_names() {
        let changes = TaskChanges {
            assigned_to: Some(Some(5)),
            ..TaskChanges::default()
        };
        let diff = diff_task(&task(), &changes);
        assert_eq!(diff[0].user_ids(), vec![5]);

        let mut people = HashMap::new();
        people.insert(
            5,
            UserSummary {
                id: 5,
                username: "ana".to_string(),
                name: Some("Ana Lima".to_string()),
            },
        );
        assert_eq!(
            diff[0].render(&people),
            ("Unassigned".to_string(), "Ana Lima".to_string())
        );
    }

    #[tokio::test]
    async fn test_task_changes_use_specific_actions() {
        let recorder = Arc::new(CapturingRecorder::default());
        let ledger = ActivityLedger::new(recorder.clone());

        let changes = TaskChanges {
            title: Some("Write more docs".to_string()),
            priority: Some(Priority::Urgent),
            assigned_to: Some(Some(9)),
            ..TaskChanges::default()
        };
        let diff = diff_task(&task(), &changes);
        ledger
            .record_task_changes(1, 2, &diff, &HashMap::new())
            .await;

        let entries = recorder.entries.lock().unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                ActivityAction::Updated,
                ActivityAction::PriorityChanged,
                ActivityAction::Assigned,
            ]
        );
        assert_eq!(entries[2].new_value.as_deref(), Some("User #9"));
        assert!(entries.iter().all(|e| e.user_id == 2));
    }

    #[tokio::test]
    async fn test_failed_append_is_swallowed() {
        let ledger = ActivityLedger::new(Arc::new(BrokenRecorder));
        ledger
            .record_created(EntityType::Task, 1, 1, "Write docs")
            .await;
        ledger.record_commented(1, 1).await;
    }
}
