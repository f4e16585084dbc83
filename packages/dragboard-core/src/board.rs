/// Board session: owns the current store snapshot, the drag session and the
/// persistence sink for the lifetime of one open board.
///
/// Every mutation is committed synchronously as a new snapshot. Mutations are
/// grouped into turns; `end_turn` hands the latest snapshot to the sink once,
/// however many commits the turn made.
use crate::config::BoardConfig;
use crate::drag::{DragError, DragEvent, DragSession, PointerInput, PointerSensor};
use crate::edit::{EditTarget, InlineEdit};
use crate::id::{new_column_id, new_task_id};
use crate::persist::{KeyValueStore, PersistSink, PersistWriter, PersistenceBridge};
use crate::reorder::{on_drag_end, on_drag_over};
use crate::store::EntityStore;
use crate::types::{ColumnId, ColumnSummary, TaskId};
use crate::view::{derive_view, ColumnView, ViewOptions};

pub struct BoardSession<P: PersistSink> {
    store: EntityStore,
    drag: DragSession,
    sensor: PointerSensor,
    sink: P,
    config: BoardConfig,
    /// Store changed since the last hand-off to the sink.
    dirty: bool,
}

impl<P: PersistSink> BoardSession<P> {
    pub fn new(store: EntityStore, sink: P, config: BoardConfig) -> Self {
        Self {
            store,
            drag: DragSession::new(),
            sensor: PointerSensor::new(config.activation_constraint()),
            sink,
            config,
            dirty: false,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Cheap copy of the current snapshot.
    pub fn snapshot(&self) -> EntityStore {
        self.store.clone()
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn summaries(&self) -> Vec<ColumnSummary> {
        self.store.summaries()
    }

    pub fn view(&self, options: &ViewOptions) -> Vec<ColumnView<'_>> {
        derive_view(&self.store, options)
    }

    fn commit(&mut self, next: Option<EntityStore>) -> bool {
        let Some(next) = next else {
            return false;
        };
        debug_assert!(next.is_consistent(), "committed store has orphan tasks");
        self.store = next;
        self.dirty = true;
        true
    }

    // ── Columns ─────────────────────────────────────────────────────────────

    /// Append a column titled from the configured template.
    pub fn create_column(&mut self) -> ColumnId {
        let title = self.config.column_title(self.store.columns().len() + 1);
        self.create_column_titled(title)
    }

    pub fn create_column_titled(&mut self, title: impl Into<String>) -> ColumnId {
        let id = new_column_id(&self.store);
        let next = self.store.create_column(id.clone(), title.into());
        self.commit(next);
        log::debug!("[dragboard.board] Created column {}", id);
        id
    }

    pub fn delete_column(&mut self, id: &ColumnId) -> bool {
        let removed = self.store.task_count(id);
        let next = self.store.delete_column(id);
        let changed = self.commit(next);
        if changed {
            log::debug!("[dragboard.board] Deleted column {} with {} task(s)", id, removed);
        }
        changed
    }

    pub fn rename_column(&mut self, id: &ColumnId, title: impl Into<String>) -> bool {
        let next = self.store.rename_column(id, title.into());
        self.commit(next)
    }

    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let next = self.store.move_column(from, to);
        self.commit(next)
    }

    // ── Tasks ───────────────────────────────────────────────────────────────

    /// Append a task with the configured default content. `None` when the
    /// column does not exist.
    pub fn create_task(&mut self, column_id: &ColumnId) -> Option<TaskId> {
        let content = self.config.default_task_content.clone();
        self.create_task_with_content(column_id, content)
    }

    pub fn create_task_with_content(
        &mut self,
        column_id: &ColumnId,
        content: impl Into<String>,
    ) -> Option<TaskId> {
        let id = new_task_id(&self.store);
        let next = self.store.create_task(id.clone(), column_id.clone(), content.into());
        if self.commit(next) {
            log::debug!("[dragboard.board] Created task {} in {}", id, column_id);
            Some(id)
        } else {
            None
        }
    }

    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let next = self.store.delete_task(id);
        self.commit(next)
    }

    pub fn edit_task(&mut self, id: &TaskId, content: impl Into<String>) -> bool {
        let next = self.store.edit_task_content(id, content.into());
        self.commit(next)
    }

    /// Reassign a task and optionally move it to a flat sequence index.
    pub fn move_task(&mut self, id: &TaskId, column_id: &ColumnId, index: Option<usize>) -> bool {
        let next = self.store.move_task(id, column_id, index);
        self.commit(next)
    }

    /// Remove every column and task.
    pub fn reset(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }
        self.drag.end();
        log::info!("[dragboard.board] Board reset");
        self.commit(Some(EntityStore::new()))
    }

    // ── Inline editing ──────────────────────────────────────────────────────

    pub fn begin_edit(&self, target: EditTarget) -> Option<InlineEdit> {
        InlineEdit::begin(&self.store, target)
    }

    /// Apply a finished edit. Unchanged drafts are a no-op.
    pub fn commit_edit(&mut self, edit: &InlineEdit) -> bool {
        let next = edit.apply(&self.store);
        self.commit(next)
    }

    // ── Drag and drop ───────────────────────────────────────────────────────

    /// Apply one drag event. Returns whether the store changed.
    ///
    /// Events for an entity other than the lifted one are ignored, as are
    /// repeats of the previous drag-over frame.
    pub fn dispatch(&mut self, event: DragEvent) -> Result<bool, DragError> {
        match event {
            DragEvent::Start { entity } => {
                let Some(current) = self.store.snapshot_of(&entity.drag_ref()) else {
                    log::debug!("[dragboard.board] Ignoring drag of unknown {}", entity.drag_ref());
                    return Ok(false);
                };
                self.drag.begin(current)?;
                Ok(false)
            }
            DragEvent::Over { active, over } => {
                if !self.drag.is_lifting(&active) {
                    return Ok(false);
                }
                if !self.drag.observe_over(&active, over.as_ref()) {
                    return Ok(false);
                }
                let next = on_drag_over(&self.store, &active, over.as_ref());
                Ok(self.commit(next))
            }
            DragEvent::End { active, over } => {
                if !self.drag.is_lifting(&active) {
                    return Ok(false);
                }
                let next = on_drag_end(&self.store, &mut self.drag, &active, over.as_ref());
                Ok(self.commit(next))
            }
            DragEvent::Cancel { active } => {
                if !self.drag.is_lifting(&active) {
                    return Ok(false);
                }
                log::debug!("[dragboard.board] Drag of {} cancelled", active);
                self.drag.end();
                Ok(false)
            }
        }
    }

    /// Feed raw pointer input through the sensor and apply the drag events it
    /// produces.
    pub fn pointer(&mut self, input: PointerInput) -> Result<bool, DragError> {
        let mut changed = false;
        for event in self.sensor.handle(input) {
            match self.dispatch(event) {
                Ok(applied) => changed |= applied,
                Err(e) => {
                    // the rejected gesture must not later end the active one
                    log::warn!("[dragboard.board] Pointer drag rejected: {}", e);
                    self.sensor.reset();
                    return Err(e);
                }
            }
        }
        Ok(changed)
    }

    // ── Turns ───────────────────────────────────────────────────────────────

    /// Hand the current snapshot to the sink if anything changed this turn.
    pub fn end_turn(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.sink.submit(&self.store);
        self.dirty = false;
        true
    }

    /// Run `f` as one turn.
    pub fn turn<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let result = f(self);
        self.end_turn();
        result
    }

    /// Flush pending changes and give back the sink.
    pub fn close(mut self) -> P {
        if self.drag.is_active() {
            self.drag.end();
        }
        self.end_turn();
        self.sink
    }
}

impl<S: KeyValueStore> BoardSession<PersistenceBridge<S>> {
    /// Load the board through `bridge` and write changes back synchronously.
    pub fn open(mut bridge: PersistenceBridge<S>, config: BoardConfig) -> Self {
        let store = bridge.load();
        Self::new(store, bridge, config)
    }
}

impl<S: KeyValueStore + 'static> BoardSession<PersistWriter<S>> {
    /// Load the board through `bridge`, then persist from a background task.
    /// Must be called inside a tokio runtime.
    pub fn open_with_writer(mut bridge: PersistenceBridge<S>, config: BoardConfig) -> Self {
        let store = bridge.load();
        Self::new(store, PersistWriter::spawn(bridge), config)
    }

    /// Close the board and wait for the last write.
    pub async fn shutdown(self) -> Option<PersistenceBridge<S>> {
        self.close().shutdown().await
    }
}
