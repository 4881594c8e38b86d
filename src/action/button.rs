//! Button and draggable button actions

use super::{ActionCtx, ActionId};
use crate::dispatch::{BoolHandler, BoolRoute, PriorityTier, Registry, VectorHandler, VectorRoute};
use crate::input::LogicalKey;
use crate::touch::{Point, TouchPhase, TouchSlot};

/// Holds a touch at a fixed point while its key is down
#[derive(Debug)]
pub struct ButtonAction {
    key: LogicalKey,
    point: Point,
    slot: TouchSlot,
}

impl ButtonAction {
    pub fn new(key: LogicalKey, point: Point) -> Self {
        Self {
            key,
            point,
            slot: TouchSlot::new(),
        }
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_boolean(
            self.key,
            BoolHandler {
                action: id,
                route: BoolRoute::Press,
            },
        );
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, pressed: bool) {
        let phase = if pressed {
            TouchPhase::Began
        } else {
            TouchPhase::Ended
        };
        ctx.touch(&mut self.slot, self.point, phase);
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        ctx.touch(&mut self.slot, self.point, TouchPhase::Ended);
    }
}

/// A button whose touch follows pointer motion while held
///
/// While pressed, the pointer key is routed to this action through a transient
/// handler in the draggable tier, which outranks camera look.
#[derive(Debug)]
pub struct DraggableButtonAction {
    key: LogicalKey,
    origin: Point,
    location: Point,
    slot: TouchSlot,
    hid_cursor: bool,
}

impl DraggableButtonAction {
    pub fn new(key: LogicalKey, origin: Point) -> Self {
        Self {
            key,
            origin,
            location: origin,
            slot: TouchSlot::new(),
            hid_cursor: false,
        }
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_boolean(
            self.key,
            BoolHandler {
                action: id,
                route: BoolRoute::Press,
            },
        );
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, pressed: bool) {
        if pressed {
            self.press(ctx);
        } else {
            self.release(ctx);
        }
    }

    fn press(&mut self, ctx: &mut ActionCtx<'_>) {
        if self.slot.is_active() {
            return;
        }
        self.location = self.origin;
        ctx.touch(&mut self.slot, self.location, TouchPhase::Began);
        if !self.slot.is_active() {
            return;
        }

        ctx.registry.register_vector(
            PriorityTier::Draggable,
            VectorHandler {
                action: ctx.id,
                key: LogicalKey::POINTER,
                route: VectorRoute::Drag,
            },
        );
        if !ctx.cursor.is_hidden() {
            ctx.cursor.hide();
            self.hid_cursor = true;
        }
    }

    pub fn drag(&mut self, ctx: &mut ActionCtx<'_>, dx: f32, dy: f32) {
        if !self.slot.is_active() {
            return;
        }
        let sensitivity = ctx.tuning.drag_sensitivity;
        self.location = ctx.screen.clamp([
            self.location[0] + dx * sensitivity,
            self.location[1] + dy * sensitivity,
        ]);
        ctx.touch(&mut self.slot, self.location, TouchPhase::Moved);
    }

    fn release(&mut self, ctx: &mut ActionCtx<'_>) {
        ctx.touch(&mut self.slot, self.location, TouchPhase::Ended);
        if self.slot.is_active() {
            return;
        }

        ctx.registry
            .unregister_vector(PriorityTier::Draggable, LogicalKey::POINTER, ctx.id);
        if self.hid_cursor {
            ctx.cursor.unhide();
            self.hid_cursor = false;
        }
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        self.release(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::action::harness::Harness;
    use crate::input::KeyCode;
    use crate::mode::CursorControl;

    #[test]
    fn test_button_press_and_release() {
        let mut harness = Harness::new(1000.0, 1000.0);
        let mut action = Action::Button(ButtonAction::new(
            LogicalKey::Key(KeyCode::A),
            [100.0, 100.0],
        ));

        harness.key(&mut action, BoolRoute::Press, true);
        harness.key(&mut action, BoolRoute::Press, false);

        assert_eq!(
            harness.events(),
            vec![
                (TouchPhase::Began, [100.0, 100.0]),
                (TouchPhase::Ended, [100.0, 100.0]),
            ]
        );
    }

    #[test]
    fn test_button_invalidate_when_idle_is_noop() {
        let mut harness = Harness::new(1000.0, 1000.0);
        let mut action = Action::Button(ButtonAction::new(LogicalKey::Key(KeyCode::A), [1.0, 1.0]));
        harness.invalidate(&mut action);
        assert!(harness.events().is_empty());
    }

    #[test]
    fn test_drag_registers_pointer_and_moves() {
        let mut harness = Harness::new(1000.0, 1000.0);
        let mut action = Action::DraggableButton(DraggableButtonAction::new(
            LogicalKey::Key(KeyCode::F),
            [500.0, 500.0],
        ));

        harness.key(&mut action, BoolRoute::Press, true);
        assert_eq!(
            harness.registry.routing().priority(LogicalKey::POINTER),
            Some(PriorityTier::Draggable)
        );
        assert!(harness.cursor.is_hidden());

        harness.vector(&mut action, VectorRoute::Drag, 30.0, -20.0);
        harness.vector(&mut action, VectorRoute::Drag, 1000.0, 0.0);
        harness.key(&mut action, BoolRoute::Press, false);

        assert_eq!(
            harness.events(),
            vec![
                (TouchPhase::Began, [500.0, 500.0]),
                (TouchPhase::Moved, [530.0, 480.0]),
                (TouchPhase::Moved, [1000.0, 480.0]),
                (TouchPhase::Ended, [1000.0, 480.0]),
            ]
        );
        assert_eq!(harness.registry.routing().priority(LogicalKey::POINTER), None);
        assert!(!harness.cursor.is_hidden());
    }

    #[test]
    fn test_drag_leaves_cursor_hidden_by_others() {
        let mut harness = Harness::new(1000.0, 1000.0);
        harness.cursor.hide();
        let mut action = Action::DraggableButton(DraggableButtonAction::new(
            LogicalKey::Key(KeyCode::F),
            [500.0, 500.0],
        ));

        harness.key(&mut action, BoolRoute::Press, true);
        harness.key(&mut action, BoolRoute::Press, false);
        assert!(harness.cursor.is_hidden());
    }

    #[test]
    fn test_drag_restarts_from_origin() {
        let mut harness = Harness::new(1000.0, 1000.0);
        let mut action = Action::DraggableButton(DraggableButtonAction::new(
            LogicalKey::Key(KeyCode::F),
            [500.0, 500.0],
        ));

        harness.key(&mut action, BoolRoute::Press, true);
        harness.vector(&mut action, VectorRoute::Drag, 50.0, 0.0);
        harness.invalidate(&mut action);
        harness.take_events();

        harness.key(&mut action, BoolRoute::Press, true);
        assert_eq!(harness.events(), vec![(TouchPhase::Began, [500.0, 500.0])]);
    }
}
