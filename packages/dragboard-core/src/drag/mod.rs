/// Drag gesture plumbing: the events delivered by the pointer sensor, the
/// transient drag session, and the sensor that turns raw pointer input into
/// drag events.
pub mod sensor;
pub mod session;

use serde::{Deserialize, Serialize};

use crate::types::{DragEntity, DragRef};

pub use sensor::{ActivationConstraint, Point, PointerInput, PointerSensor};
pub use session::{DragError, DragSession};

/// Events for a single drag gesture, delivered in order:
/// `Start`, any number of `Over`, then exactly one of `End` or `Cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragEvent {
    Start {
        entity: DragEntity,
    },
    Over {
        active: DragRef,
        #[serde(default)]
        over: Option<DragRef>,
    },
    End {
        active: DragRef,
        #[serde(default)]
        over: Option<DragRef>,
    },
    Cancel {
        active: DragRef,
    },
}

impl DragEvent {
    /// The entity this event is about.
    pub fn active(&self) -> DragRef {
        match self {
            DragEvent::Start { entity } => entity.drag_ref(),
            DragEvent::Over { active, .. }
            | DragEvent::End { active, .. }
            | DragEvent::Cancel { active } => active.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnId, TaskId};

    #[test]
    fn test_drag_event_json_shape() {
        let line = r#"{"type":"over","active":{"kind":"task","id":"t1"},"over":{"kind":"column","id":"c2"}}"#;
        let event: DragEvent = serde_json::from_str(line).unwrap();
        assert_eq!(
            event,
            DragEvent::Over {
                active: DragRef::Task(TaskId::from("t1")),
                over: Some(DragRef::Column(ColumnId::from("c2"))),
            }
        );
    }

    #[test]
    fn test_drag_event_missing_over_is_none() {
        let line = r#"{"type":"end","active":{"kind":"column","id":"c1"}}"#;
        let event: DragEvent = serde_json::from_str(line).unwrap();
        assert_eq!(
            event,
            DragEvent::End {
                active: DragRef::Column(ColumnId::from("c1")),
                over: None,
            }
        );
        assert_eq!(event.active(), DragRef::Column(ColumnId::from("c1")));
    }
}
