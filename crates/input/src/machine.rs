use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ZoomDirection};

/// Raw pointer input in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { at: Vec2 },
    Up { at: Vec2 },
    Move { at: Vec2 },
    Leave,
    /// Positive `delta_y` scrolls down.
    Wheel { delta_y: f32, at: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering { at: Vec2 },
    /// `anchor` is where the last applied drag delta ended.
    Dragging { anchor: Vec2 },
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Step {
    /// Action to apply right away.
    pub action: Option<Action>,
    /// The host should schedule one [`Interaction::on_frame`] call at the
    /// next display refresh. Set only on the event that opened the gate.
    pub request_frame: bool,
}

/// Pointer interaction state machine with a per-refresh gate.
///
/// Press, release and leave act immediately. Move and wheel events are held in
/// one slot each, later events overwriting earlier ones, and turned into
/// actions once per refresh, so at most one redraw is scheduled per frame.
#[derive(Debug, Default)]
pub struct Interaction {
    state: InteractionState,
    pending_move: Option<Vec2>,
    pending_wheel: Option<(f32, Vec2)>,
    frame_requested: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    /// A frame was requested and has not been delivered yet.
    pub fn frame_pending(&self) -> bool {
        self.frame_requested
    }

    pub fn handle(&mut self, event: PointerEvent) -> Step {
        match event {
            PointerEvent::Down { at } => {
                tracing::trace!(?at, "drag start");
                // Motion before the press is not drag motion.
                self.pending_move = None;
                let was_hovering = matches!(self.state, InteractionState::Hovering { .. });
                self.state = InteractionState::Dragging { anchor: at };
                Step {
                    action: was_hovering.then_some(Action::ClearHover),
                    request_frame: false,
                }
            }
            PointerEvent::Up { at } => {
                // Deliver a drag delta that was still waiting for a frame.
                let action = match self.state {
                    InteractionState::Dragging { anchor } => {
                        let end = self.pending_move.take().unwrap_or(at);
                        pan(end - anchor)
                    }
                    _ => None,
                };
                tracing::trace!(?at, "drag end");
                self.state = InteractionState::Idle;
                Step {
                    action,
                    request_frame: false,
                }
            }
            PointerEvent::Leave => {
                self.state = InteractionState::Idle;
                self.pending_move = None;
                Step {
                    action: Some(Action::ClearHover),
                    request_frame: false,
                }
            }
            PointerEvent::Move { at } => {
                self.pending_move = Some(at);
                self.open_gate()
            }
            PointerEvent::Wheel { delta_y, at } => {
                if delta_y == 0.0 || !delta_y.is_finite() {
                    return Step::default();
                }
                self.pending_wheel = Some((delta_y, at));
                self.open_gate()
            }
        }
    }

    fn open_gate(&mut self) -> Step {
        let request_frame = !self.frame_requested;
        self.frame_requested = true;
        Step {
            action: None,
            request_frame,
        }
    }

    /// Display refresh: turn the coalesced move and wheel into actions.
    pub fn on_frame(&mut self) -> Vec<Action> {
        self.frame_requested = false;
        let mut actions = Vec::with_capacity(2);

        if let Some((delta_y, at)) = self.pending_wheel.take() {
            let direction = if delta_y > 0.0 {
                ZoomDirection::Out
            } else {
                ZoomDirection::In
            };
            actions.push(Action::Zoom { direction, at });
        }

        if let Some(at) = self.pending_move.take() {
            match self.state {
                InteractionState::Dragging { anchor } => {
                    self.state = InteractionState::Dragging { anchor: at };
                    actions.extend(pan(at - anchor));
                }
                InteractionState::Idle | InteractionState::Hovering { .. } => {
                    self.state = InteractionState::Hovering { at };
                    actions.push(Action::Hover { at });
                }
            }
        }
        actions
    }
}

fn pan(delta: Vec2) -> Option<Action> {
    (delta != Vec2::ZERO).then_some(Action::Pan { delta })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn drag_pans_by_delta_since_anchor() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Down { at: at(10.0, 10.0) });
        assert!(m.is_dragging());

        let step = m.handle(PointerEvent::Move { at: at(15.0, 12.0) });
        assert!(step.request_frame);
        assert_eq!(m.on_frame(), [Action::Pan { delta: at(5.0, 2.0) }]);

        m.handle(PointerEvent::Move { at: at(20.0, 12.0) });
        assert_eq!(m.on_frame(), [Action::Pan { delta: at(5.0, 0.0) }]);

        m.handle(PointerEvent::Up { at: at(20.0, 12.0) });
        assert_eq!(m.state(), InteractionState::Idle);
    }

    #[test]
    fn moves_coalesce_last_wins() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Down { at: at(0.0, 0.0) });
        let first = m.handle(PointerEvent::Move { at: at(1.0, 0.0) });
        let second = m.handle(PointerEvent::Move { at: at(2.0, 0.0) });
        let third = m.handle(PointerEvent::Move { at: at(7.0, 3.0) });
        assert!(first.request_frame);
        assert!(!second.request_frame && !third.request_frame);
        assert!(m.frame_pending());

        // Intermediate moves are dropped; the total delta is preserved.
        assert_eq!(m.on_frame(), [Action::Pan { delta: at(7.0, 3.0) }]);
        assert!(!m.frame_pending());
        assert!(m.on_frame().is_empty());
    }

    #[test]
    fn hover_when_not_dragging() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Move { at: at(4.0, 5.0) });
        assert_eq!(m.on_frame(), [Action::Hover { at: at(4.0, 5.0) }]);
        assert_eq!(m.state(), InteractionState::Hovering { at: at(4.0, 5.0) });
    }

    #[test]
    fn leave_clears_hover_and_drops_pending_move() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Move { at: at(4.0, 5.0) });
        let step = m.handle(PointerEvent::Leave);
        assert_eq!(step.action, Some(Action::ClearHover));
        assert_eq!(m.state(), InteractionState::Idle);
        assert!(m.on_frame().is_empty());
    }

    #[test]
    fn leave_aborts_drag() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Down { at: at(0.0, 0.0) });
        m.handle(PointerEvent::Leave);
        m.handle(PointerEvent::Move { at: at(50.0, 50.0) });
        assert_eq!(m.on_frame(), [Action::Hover { at: at(50.0, 50.0) }]);
    }

    #[test]
    fn release_flushes_pending_drag() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Down { at: at(0.0, 0.0) });
        m.handle(PointerEvent::Move { at: at(3.0, 4.0) });
        let step = m.handle(PointerEvent::Up { at: at(3.0, 4.0) });
        assert_eq!(step.action, Some(Action::Pan { delta: at(3.0, 4.0) }));
        assert!(m.on_frame().is_empty());
    }

    #[test]
    fn move_before_press_is_not_dragged() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Move { at: at(0.0, 0.0) });
        m.handle(PointerEvent::Down { at: at(10.0, 10.0) });
        let step = m.handle(PointerEvent::Up { at: at(10.0, 10.0) });
        assert_eq!(step.action, None);

        m.handle(PointerEvent::Move { at: at(5.0, 5.0) });
        m.handle(PointerEvent::Down { at: at(10.0, 10.0) });
        assert!(m.on_frame().is_empty());
        assert!(m.is_dragging());
    }

    #[test]
    fn press_while_hovering_clears_hover() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Move { at: at(4.0, 5.0) });
        m.on_frame();
        let step = m.handle(PointerEvent::Down { at: at(4.0, 5.0) });
        assert_eq!(step.action, Some(Action::ClearHover));
        assert!(!step.request_frame);
    }

    #[test]
    fn click_without_motion_does_not_pan() {
        let mut m = Interaction::new();
        m.handle(PointerEvent::Down { at: at(9.0, 9.0) });
        let step = m.handle(PointerEvent::Up { at: at(9.0, 9.0) });
        assert_eq!(step.action, None);
    }

    #[test]
    fn wheel_direction_and_zero() {
        let mut m = Interaction::new();
        assert!(!m.handle(PointerEvent::Wheel { delta_y: 0.0, at: at(1.0, 1.0) }).request_frame);
        assert!(m.on_frame().is_empty());

        m.handle(PointerEvent::Wheel { delta_y: 120.0, at: at(1.0, 1.0) });
        assert_eq!(
            m.on_frame(),
            [Action::Zoom { direction: ZoomDirection::Out, at: at(1.0, 1.0) }]
        );

        m.handle(PointerEvent::Wheel { delta_y: 120.0, at: at(1.0, 1.0) });
        m.handle(PointerEvent::Wheel { delta_y: -3.0, at: at(2.0, 2.0) });
        assert_eq!(
            m.on_frame(),
            [Action::Zoom { direction: ZoomDirection::In, at: at(2.0, 2.0) }]
        );
    }

    #[test]
    fn wheel_and_move_share_one_frame() {
        let mut m = Interaction::new();
        let a = m.handle(PointerEvent::Wheel { delta_y: -1.0, at: at(0.0, 0.0) });
        let b = m.handle(PointerEvent::Move { at: at(1.0, 1.0) });
        assert!(a.request_frame);
        assert!(!b.request_frame);
        assert_eq!(m.on_frame().len(), 2);
    }

    #[test]
    fn events_deserialize_from_json() {
        let e: PointerEvent = serde_json::from_str(r#"{"event": "wheel", "delta_y": -1, "at": [3, 4]}"#).unwrap();
        assert_eq!(e, PointerEvent::Wheel { delta_y: -1.0, at: at(3.0, 4.0) });
    }
}
