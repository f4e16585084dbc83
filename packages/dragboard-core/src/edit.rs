/// Inline editing of column titles and task content.
///
/// A column title commits on blur or Enter. Task content is multi-line: it
/// commits on blur or Shift+Enter, and a plain Enter inserts a newline.
use crate::store::EntityStore;
use crate::types::{ColumnId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    ShiftEnter,
    Blur,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    ColumnTitle(ColumnId),
    TaskContent(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit {
    target: EditTarget,
    original: String,
    draft: String,
}

impl InlineEdit {
    /// Start editing; the draft starts as the current value. `None` when the
    /// target does not exist.
    pub fn begin(store: &EntityStore, target: EditTarget) -> Option<Self> {
        let original = match &target {
            EditTarget::ColumnTitle(id) => store.column(id)?.title.clone(),
            EditTarget::TaskContent(id) => store.task(id)?.content.clone(),
        };
        Some(Self {
            target,
            draft: original.clone(),
            original,
        })
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_changed(&self) -> bool {
        self.draft != self.original
    }

    pub fn commits_on(&self, key: EditKey) -> bool {
        match (&self.target, key) {
            (_, EditKey::Blur) => true,
            (EditTarget::ColumnTitle(_), EditKey::Enter | EditKey::ShiftEnter) => true,
            (EditTarget::TaskContent(_), EditKey::ShiftEnter) => true,
            _ => false,
        }
    }

    /// Feed a key press. Returns true when the edit should be committed.
    pub fn press(&mut self, key: EditKey) -> bool {
        if key == EditKey::Enter && matches!(self.target, EditTarget::TaskContent(_)) {
            self.draft.push('\n');
            return false;
        }
        self.commits_on(key)
    }

    /// The store with the draft applied, or `None` when nothing changes.
    pub fn apply(&self, store: &EntityStore) -> Option<EntityStore> {
        if !self.is_changed() {
            return None;
        }
        match &self.target {
            EditTarget::ColumnTitle(id) => store.rename_column(id, self.draft.clone()),
            EditTarget::TaskContent(id) => store.edit_task_content(id, self.draft.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, Task};

    fn store() -> EntityStore {
        EntityStore::from_parts(
            vec![Column {
                id: ColumnId::from("c1"),
                title: "Todo".into(),
            }],
            vec![Task {
                id: TaskId::from("t1"),
                column_id: ColumnId::from("c1"),
                content: "Buy milk".into(),
            }],
        )
    }

    #[test]
    fn test_column_title_commits_on_enter_and_blur() {
        let edit = InlineEdit::begin(&store(), EditTarget::ColumnTitle(ColumnId::from("c1"))).unwrap();
        assert!(edit.commits_on(EditKey::Enter));
        assert!(edit.commits_on(EditKey::Blur));
        assert!(!edit.commits_on(EditKey::Other));
    }

    #[test]
    fn test_task_enter_inserts_newline() {
        let mut edit = InlineEdit::begin(&store(), EditTarget::TaskContent(TaskId::from("t1"))).unwrap();
        assert!(!edit.press(EditKey::Enter));
        assert_eq!(edit.draft(), "Buy milk\n");
        assert!(edit.press(EditKey::ShiftEnter));
        assert!(edit.commits_on(EditKey::Blur));
    }

    #[test]
    fn test_apply_changed_draft() {
        let store = store();
        let mut edit = InlineEdit::begin(&store, EditTarget::TaskContent(TaskId::from("t1"))).unwrap();
        edit.set_draft("Buy oat milk");
        let next = edit.apply(&store).unwrap();
        assert_eq!(next.task(&TaskId::from("t1")).unwrap().content, "Buy oat milk");
    }

    #[test]
    fn test_unchanged_draft_is_noop() {
        let store = store();
        let mut edit = InlineEdit::begin(&store, EditTarget::ColumnTitle(ColumnId::from("c1"))).unwrap();
        assert!(edit.apply(&store).is_none());
        edit.set_draft("Doing");
        edit.set_draft("Todo");
        assert!(!edit.is_changed());
        assert!(edit.apply(&store).is_none());
    }

    #[test]
    fn test_begin_unknown_target() {
        assert!(InlineEdit::begin(&store(), EditTarget::TaskContent(TaskId::from("nope"))).is_none());
    }

    #[test]
    fn test_apply_after_target_deleted() {
        let store = store();
        let mut edit = InlineEdit::begin(&store, EditTarget::TaskContent(TaskId::from("t1"))).unwrap();
        edit.set_draft("changed");
        let gone = store.delete_task(&TaskId::from("t1")).unwrap();
        assert!(edit.apply(&gone).is_none());
    }
}
