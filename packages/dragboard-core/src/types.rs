use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque column identifier, stable for the column's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

/// Opaque task identifier, stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl ColumnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Non-owning reference to the parent column.
    pub column_id: ColumnId,
    pub content: String,
}

/// The two kinds of draggable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragKind {
    Column,
    Task,
}

/// Reference to a draggable entity: the id together with its kind tag.
///
/// Serialized as `{"kind": "task", "id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum DragRef {
    Column(ColumnId),
    Task(TaskId),
}

impl DragRef {
    pub fn kind(&self) -> DragKind {
        match self {
            DragRef::Column(_) => DragKind::Column,
            DragRef::Task(_) => DragKind::Task,
        }
    }
}

impl fmt::Display for DragRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragRef::Column(id) => write!(f, "column:{}", id),
            DragRef::Task(id) => write!(f, "task:{}", id),
        }
    }
}

/// Snapshot of the entity lifted at drag-start. A copy, not a live
/// reference into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum DragEntity {
    Column(Column),
    Task(Task),
}

impl DragEntity {
    pub fn drag_ref(&self) -> DragRef {
        match self {
            DragEntity::Column(column) => DragRef::Column(column.id.clone()),
            DragEntity::Task(task) => DragRef::Task(task.id.clone()),
        }
    }

    pub fn kind(&self) -> DragKind {
        match self {
            DragEntity::Column(_) => DragKind::Column,
            DragEntity::Task(_) => DragKind::Task,
        }
    }
}

/// Column ordering offered by the sort selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    TitleAsc,
    TitleDesc,
    TaskCountDesc,
    TaskCountAsc,
}

/// Sort option keys in selector order.
pub const SORT_OPTION_KEYS: &[&str] = &["title-asc", "title-desc", "task-count-desc", "task-count-asc"];

impl SortOption {
    pub fn key(self) -> &'static str {
        match self {
            SortOption::TitleAsc => "title-asc",
            SortOption::TitleDesc => "title-desc",
            SortOption::TaskCountDesc => "task-count-desc",
            SortOption::TaskCountAsc => "task-count-asc",
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title-asc" => Ok(SortOption::TitleAsc),
            "title-desc" => Ok(SortOption::TitleDesc),
            "task-count-desc" => Ok(SortOption::TaskCountDesc),
            "task-count-asc" => Ok(SortOption::TaskCountAsc),
            other => Err(format!(
                "unknown sort option '{}' (expected one of: {})",
                other,
                SORT_OPTION_KEYS.join(", ")
            )),
        }
    }
}

/// Summary info for a column in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub index: usize,
    pub id: ColumnId,
    pub title: String,
    pub task_count: usize,
}
