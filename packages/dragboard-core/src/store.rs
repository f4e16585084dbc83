/// Entity store: the authoritative ordered sequences of columns and tasks.
///
/// An `EntityStore` is an immutable snapshot. Every mutation primitive takes
/// `&self` and returns a new snapshot reflecting exactly one change, or `None`
/// when the call would not change anything (unknown id, same value, index out
/// of range). Sequences are held as `Arc<[T]>`: a sequence untouched by a
/// mutation is shared with the previous snapshot, a touched one is freshly
/// allocated, so readers holding an older snapshot never observe a change.
use std::collections::HashSet;
use std::sync::Arc;

use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStore {
    columns: Arc<[Column]>,
    tasks: Arc<[Task]>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Array move-by-index: remove the element at `from`, insert it at `to`.
/// Returns `None` when either index is out of range.
pub fn move_by_index<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }
    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    Some(out)
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            tasks: Arc::from(Vec::new()),
        }
    }

    /// Build a store from already-consistent sequences.
    ///
    /// Callers loading untrusted data should use [`EntityStore::from_persisted`].
    pub fn from_parts(columns: Vec<Column>, tasks: Vec<Task>) -> Self {
        Self {
            columns: columns.into(),
            tasks: tasks.into(),
        }
    }

    /// Build a store from persisted sequences, dropping anything that would
    /// break the store invariants: duplicate ids (first occurrence wins) and
    /// tasks whose column does not exist. Returns the store and the dropped tasks.
    pub fn from_persisted(columns: Vec<Column>, tasks: Vec<Task>) -> (Self, Vec<Task>) {
        let mut seen_columns = HashSet::new();
        let columns: Vec<Column> = columns
            .into_iter()
            .filter(|c| seen_columns.insert(c.id.clone()))
            .collect();

        let mut seen_tasks = HashSet::new();
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen_columns.contains(&task.column_id) && seen_tasks.insert(task.id.clone()) {
                kept.push(task);
            } else {
                dropped.push(task);
            }
        }
        (Self::from_parts(columns, kept), dropped)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.tasks.is_empty()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Index of a task in the flat task sequence.
    pub fn task_index(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Tasks of one column, in sequence order.
    pub fn tasks_in<'a>(&'a self, column_id: &'a ColumnId) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| &t.column_id == column_id)
    }

    pub fn task_count(&self, column_id: &ColumnId) -> usize {
        self.tasks_in(column_id).count()
    }

    pub fn summaries(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, c)| ColumnSummary {
                index,
                id: c.id.clone(),
                title: c.title.clone(),
                task_count: self.task_count(&c.id),
            })
            .collect()
    }

    /// Snapshot copy of an entity, as lifted at drag-start.
    pub fn snapshot_of(&self, entity: &DragRef) -> Option<DragEntity> {
        match entity {
            DragRef::Column(id) => self.column(id).cloned().map(DragEntity::Column),
            DragRef::Task(id) => self.task(id).cloned().map(DragEntity::Task),
        }
    }

    /// Tasks whose column is missing from the store.
    pub fn orphans(&self) -> Vec<&Task> {
        let ids: HashSet<&ColumnId> = self.columns.iter().map(|c| &c.id).collect();
        self.tasks.iter().filter(|t| !ids.contains(&t.column_id)).collect()
    }

    /// True when every task references an existing column.
    pub fn is_consistent(&self) -> bool {
        self.orphans().is_empty()
    }

    fn with_columns(&self, columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into(),
            tasks: Arc::clone(&self.tasks),
        }
    }

    fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            tasks: tasks.into(),
        }
    }

    // ── Column primitives ───────────────────────────────────────────────────

    /// Append a column. No-op if the id is already taken.
    pub fn create_column(&self, id: ColumnId, title: String) -> Option<Self> {
        if self.column(&id).is_some() {
            return None;
        }
        let mut columns = self.columns.to_vec();
        columns.push(Column { id, title });
        Some(self.with_columns(columns))
    }

    /// Remove a column together with every task it contains.
    pub fn delete_column(&self, id: &ColumnId) -> Option<Self> {
        self.column_index(id)?;
        let columns: Vec<Column> = self.columns.iter().filter(|c| &c.id != id).cloned().collect();
        let tasks: Vec<Task> = self.tasks.iter().filter(|t| &t.column_id != id).cloned().collect();
        Some(Self {
            columns: Arc::from(columns),
            tasks: Arc::from(tasks),
        })
    }

    pub fn rename_column(&self, id: &ColumnId, title: String) -> Option<Self> {
        let index = self.column_index(id)?;
        if self.columns[index].title == title {
            return None;
        }
        let mut columns = self.columns.to_vec();
        columns[index].title = title;
        Some(self.with_columns(columns))
    }

    pub fn move_column(&self, from: usize, to: usize) -> Option<Self> {
        if from == to {
            return None;
        }
        move_by_index(&self.columns[..], from, to).map(|columns| self.with_columns(columns))
    }

    // ── Task primitives ─────────────────────────────────────────────────────

    /// Append a task to the end of the flat sequence, attached to `column_id`.
    /// No-op if the column does not exist or the id is already taken.
    pub fn create_task(&self, id: TaskId, column_id: ColumnId, content: String) -> Option<Self> {
        self.column(&column_id)?;
        if self.task(&id).is_some() {
            return None;
        }
        let mut tasks = self.tasks.to_vec();
        tasks.push(Task {
            id,
            column_id,
            content,
        });
        Some(self.with_tasks(tasks))
    }

    pub fn delete_task(&self, id: &TaskId) -> Option<Self> {
        self.task_index(id)?;
        let tasks = self.tasks.iter().filter(|t| &t.id != id).cloned().collect();
        Some(self.with_tasks(tasks))
    }

    pub fn edit_task_content(&self, id: &TaskId, content: String) -> Option<Self> {
        let index = self.task_index(id)?;
        if self.tasks[index].content == content {
            return None;
        }
        let mut tasks = self.tasks.to_vec();
        tasks[index].content = content;
        Some(self.with_tasks(tasks))
    }

    /// Reassign a task to `column_id` and, when `index` is given, move it to
    /// that position of the flat task sequence.
    ///
    /// The index is resolved against this snapshot, not a cached one.
    pub fn move_task(&self, id: &TaskId, column_id: &ColumnId, index: Option<usize>) -> Option<Self> {
        self.column(column_id)?;
        let from = self.task_index(id)?;
        let reparent = &self.tasks[from].column_id != column_id;
        let reposition = index.is_some_and(|to| to != from);
        if !reparent && !reposition {
            return None;
        }

        let mut tasks = self.tasks.to_vec();
        tasks[from].column_id = column_id.clone();
        let tasks = match index {
            Some(to) => move_by_index(&tasks[..], from, to)?,
            None => tasks,
        };
        Some(self.with_tasks(tasks))
    }

    /// Reassign a task to another column, keeping its flat position.
    pub fn reparent_task(&self, id: &TaskId, column_id: &ColumnId) -> Option<Self> {
        self.move_task(id, column_id, None)
    }
}
