/// Transient state of the drag gesture in progress.
///
/// Holds a snapshot copy of the lifted entity so overlay rendering stays
/// decoupled from store mutations made while the drag is running.
use crate::types::{DragEntity, DragKind, DragRef};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DragError {
    #[error("Drag session already active for {active}")]
    SessionActive { active: DragRef },
}

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    lifted: Option<DragEntity>,
    /// Last drag-over frame seen during this gesture: (active, over).
    last_frame: Option<(DragRef, Option<DragRef>)>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a drag of `entity`.
    ///
    /// Fails if a session is already active for a different entity; the
    /// existing session is left untouched. Beginning again for the same
    /// entity refreshes the snapshot.
    pub fn begin(&mut self, entity: DragEntity) -> Result<(), DragError> {
        if let Some(current) = &self.lifted {
            let active = current.drag_ref();
            if active != entity.drag_ref() {
                return Err(DragError::SessionActive { active });
            }
        }
        log::debug!("[dragboard.session] Lifted {}", entity.drag_ref());
        self.lifted = Some(entity);
        self.last_frame = None;
        Ok(())
    }

    /// Clear the session unconditionally. Returns the snapshot that was lifted.
    pub fn end(&mut self) -> Option<DragEntity> {
        self.last_frame = None;
        let lifted = self.lifted.take();
        if let Some(entity) = &lifted {
            log::debug!("[dragboard.session] Released {}", entity.drag_ref());
        }
        lifted
    }

    pub fn is_active(&self) -> bool {
        self.lifted.is_some()
    }

    pub fn lifted(&self) -> Option<&DragEntity> {
        self.lifted.as_ref()
    }

    pub fn kind(&self) -> Option<DragKind> {
        self.lifted.as_ref().map(DragEntity::kind)
    }

    /// True when `active` is the entity this session lifted.
    pub fn is_lifting(&self, active: &DragRef) -> bool {
        self.lifted
            .as_ref()
            .is_some_and(|entity| &entity.drag_ref() == active)
    }

    /// Record a drag-over frame. Returns false when the frame repeats the
    /// immediately preceding one, in which case it must not be applied again.
    pub fn observe_over(&mut self, active: &DragRef, over: Option<&DragRef>) -> bool {
        let frame = (active.clone(), over.cloned());
        if self.last_frame.as_ref() == Some(&frame) {
            return false;
        }
        self.last_frame = Some(frame);
        true
    }
}
