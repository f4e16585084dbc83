/// Reorder engine: applies drag-over and drag-end events to the entity store.
///
/// Task reparenting is resolved incrementally, one drag-over frame at a time,
/// so every intermediate frame is a complete, consistent store. Column
/// reordering is applied once, at drag-end.
///
/// Both operations recompute indices from the snapshot they are given; an
/// earlier frame of the same gesture may already have moved things.
use crate::drag::DragSession;
use crate::store::EntityStore;
use crate::types::DragRef;

/// Apply one drag-over frame. Returns the next snapshot, or `None` when the
/// frame changes nothing.
///
/// No-op when there is no target, when the active entity is its own target,
/// when a column is being dragged, or when either id is unknown.
pub fn on_drag_over(store: &EntityStore, active: &DragRef, over: Option<&DragRef>) -> Option<EntityStore> {
    let over = over?;
    if active == over {
        return None;
    }
    let DragRef::Task(active_id) = active else {
        // column-over-column is resolved at drag-end
        return None;
    };

    let next = match over {
        DragRef::Task(over_id) => {
            // Task over task: take the target's column, then move to its index.
            let target_index = store.task_index(over_id)?;
            let target_column = &store.tasks()[target_index].column_id;
            store.move_task(active_id, target_column, Some(target_index))
        }
        // Task over column body: change parent only, flat position is kept.
        DragRef::Column(column_id) => store.reparent_task(active_id, column_id),
    };

    if next.is_some() {
        log::trace!("[dragboard.reorder] {} over {} applied", active, over);
    }
    next
}

/// Finish a drag. Clears the session first, whatever the outcome.
///
/// Only column drags mutate the store here: the active column moves to the
/// index of the target column. A column dropped on a task targets that task's
/// column. Task drops need no work since drag-over already placed the task.
pub fn on_drag_end(
    store: &EntityStore,
    session: &mut DragSession,
    active: &DragRef,
    over: Option<&DragRef>,
) -> Option<EntityStore> {
    session.end();

    let over = over?;
    if active == over {
        return None;
    }

    match active {
        DragRef::Task(_) => None,
        DragRef::Column(active_id) => {
            let target_id = match over {
                DragRef::Column(id) => id,
                DragRef::Task(task_id) => &store.task(task_id)?.column_id,
            };
            let from = store.column_index(active_id)?;
            let to = store.column_index(target_id)?;
            let next = store.move_column(from, to);
            if next.is_some() {
                log::debug!("[dragboard.reorder] Column {} moved {} -> {}", active_id, from, to);
            }
            next
        }
    }
}
