/// Pointer sensor: turns raw pointer input into drag events.
///
/// A press does not start a drag by itself. The drag is recognized only once
/// the pointer has travelled strictly farther than the activation distance from
/// the press point; releasing before that is a click and produces no events.
/// Hit-testing (which entity is under the pointer) belongs to the rendering
/// layer and arrives with each input.
use serde::{Deserialize, Serialize};

use super::DragEvent;
use crate::types::{DragEntity, DragRef};

pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationConstraint {
    /// Minimum pointer travel, in pixels, before a press becomes a drag.
    pub distance: f64,
}

impl Default for ActivationConstraint {
    fn default() -> Self {
        Self {
            distance: DEFAULT_ACTIVATION_DISTANCE,
        }
    }
}

impl ActivationConstraint {
    pub fn is_exceeded(&self, origin: &Point, current: &Point) -> bool {
        origin.distance_to(current) > self.distance
    }
}

/// Raw pointer input as reported by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerInput {
    /// Press on a draggable entity.
    Down { entity: DragEntity, at: Point },
    Move {
        at: Point,
        #[serde(default)]
        over: Option<DragRef>,
    },
    Up {
        #[serde(default)]
        over: Option<DragRef>,
    },
    Cancel,
}

#[derive(Debug, Clone)]
enum SensorState {
    Idle,
    Pressed { entity: DragEntity, origin: Point },
    Dragging { active: DragRef },
}

#[derive(Debug, Clone)]
pub struct PointerSensor {
    constraint: ActivationConstraint,
    state: SensorState,
}

impl Default for PointerSensor {
    fn default() -> Self {
        Self::new(ActivationConstraint::default())
    }
}

impl PointerSensor {
    pub fn new(constraint: ActivationConstraint) -> Self {
        Self {
            constraint,
            state: SensorState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SensorState::Dragging { .. })
    }

    /// Forget any press or drag in progress without emitting events.
    pub fn reset(&mut self) {
        self.state = SensorState::Idle;
    }

    /// Feed one pointer input; returns the drag events it produces, in order.
    pub fn handle(&mut self, input: PointerInput) -> Vec<DragEvent> {
        let state = std::mem::replace(&mut self.state, SensorState::Idle);
        let (next, events) = match (state, input) {
            (SensorState::Idle | SensorState::Pressed { .. }, PointerInput::Down { entity, at }) => {
                (SensorState::Pressed { entity, origin: at }, Vec::new())
            }
            // a second press while dragging is ignored
            (dragging @ SensorState::Dragging { .. }, PointerInput::Down { .. }) => (dragging, Vec::new()),

            (SensorState::Pressed { entity, origin }, PointerInput::Move { at, over }) => {
                if self.constraint.is_exceeded(&origin, &at) {
                    let active = entity.drag_ref();
                    log::trace!("[dragboard.sensor] Activated drag of {}", active);
                    let events = vec![
                        DragEvent::Start { entity },
                        DragEvent::Over {
                            active: active.clone(),
                            over,
                        },
                    ];
                    (SensorState::Dragging { active }, events)
                } else {
                    (SensorState::Pressed { entity, origin }, Vec::new())
                }
            }
            (SensorState::Dragging { active }, PointerInput::Move { over, .. }) => {
                let event = DragEvent::Over {
                    active: active.clone(),
                    over,
                };
                (SensorState::Dragging { active }, vec![event])
            }
            (SensorState::Dragging { active }, PointerInput::Up { over }) => {
                (SensorState::Idle, vec![DragEvent::End { active, over }])
            }
            (SensorState::Dragging { active }, PointerInput::Cancel) => {
                (SensorState::Idle, vec![DragEvent::Cancel { active }])
            }
            // release or cancel before activation: a click, nothing to report
            (SensorState::Pressed { .. }, PointerInput::Up { .. } | PointerInput::Cancel) => {
                (SensorState::Idle, Vec::new())
            }
            (SensorState::Idle, _) => (SensorState::Idle, Vec::new()),
        };
        self.state = next;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnId, Task, TaskId};

    fn lifted() -> DragEntity {
        DragEntity::Task(Task {
            id: TaskId::from("t1"),
            column_id: ColumnId::from("c1"),
            content: "content".into(),
        })
    }

    fn down(x: f64, y: f64) -> PointerInput {
        PointerInput::Down {
            entity: lifted(),
            at: Point::new(x, y),
        }
    }

    fn mv(x: f64, y: f64, over: Option<DragRef>) -> PointerInput {
        PointerInput::Move {
            at: Point::new(x, y),
            over,
        }
    }

    #[test]
    fn test_click_produces_no_events() {
        let mut sensor = PointerSensor::default();
        assert!(sensor.handle(down(10.0, 10.0)).is_empty());
        assert!(sensor.handle(mv(11.0, 11.0, None)).is_empty());
        assert!(sensor.handle(PointerInput::Up { over: None }).is_empty());
        assert!(!sensor.is_dragging());
    }

    #[test]
    fn test_move_at_threshold_does_not_activate() {
        let mut sensor = PointerSensor::default();
        sensor.handle(down(0.0, 0.0));
        assert!(sensor.handle(mv(2.0, 0.0, None)).is_empty());
        assert!(!sensor.is_dragging());
    }

    #[test]
    fn test_activation_then_over_and_end() {
        let mut sensor = PointerSensor::default();
        let active = DragRef::Task(TaskId::from("t1"));
        let target = DragRef::Column(ColumnId::from("c2"));

        sensor.handle(down(0.0, 0.0));
        let events = sensor.handle(mv(3.0, 0.0, Some(active.clone())));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DragEvent::Start { .. }));
        assert!(sensor.is_dragging());

        let events = sensor.handle(mv(50.0, 0.0, Some(target.clone())));
        assert_eq!(
            events,
            vec![DragEvent::Over {
                active: active.clone(),
                over: Some(target.clone())
            }]
        );

        let events = sensor.handle(PointerInput::Up {
            over: Some(target.clone()),
        });
        assert_eq!(
            events,
            vec![DragEvent::End {
                active,
                over: Some(target)
            }]
        );
        assert!(!sensor.is_dragging());
    }

    #[test]
    fn test_cancel_while_dragging() {
        let mut sensor = PointerSensor::new(ActivationConstraint { distance: 5.0 });
        sensor.handle(down(0.0, 0.0));
        sensor.handle(mv(0.0, 6.0, None));
        let events = sensor.handle(PointerInput::Cancel);
        assert_eq!(
            events,
            vec![DragEvent::Cancel {
                active: DragRef::Task(TaskId::from("t1"))
            }]
        );
        assert!(sensor.handle(PointerInput::Up { over: None }).is_empty());
    }

    #[test]
    fn test_reset_drops_drag_silently() {
        let mut sensor = PointerSensor::default();
        sensor.handle(down(0.0, 0.0));
        sensor.handle(mv(10.0, 0.0, None));
        assert!(sensor.is_dragging());
        sensor.reset();
        assert!(!sensor.is_dragging());
        assert!(sensor.handle(PointerInput::Up { over: None }).is_empty());
    }

    #[test]
    fn test_input_while_idle_is_ignored() {
        let mut sensor = PointerSensor::default();
        assert!(sensor.handle(mv(100.0, 100.0, None)).is_empty());
        assert!(sensor.handle(PointerInput::Cancel).is_empty());
    }
}
